/// Utility functions for Telegram HTML formatting
///
/// Telegram's HTML parse mode accepts a small tag set (`<b>`, `<a href>`,
/// ...) and rejects messages containing unescaped markup characters in
/// text content. This module provides the centralized escaping function.
/// Escapes HTML special characters for Telegram's HTML parse mode
///
/// Ampersands are replaced first so already-escaped entities are not
/// double-mangled. The double quote is included so escaped text is also
/// safe inside an `href` attribute.
///
/// # Example
/// ```
/// use maestro_notifier::utils::html::escape_html;
///
/// let text = "Q&A: <Rust> generics";
/// assert_eq!(escape_html(text), "Q&amp;A: &lt;Rust&gt; generics");
/// ```
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
