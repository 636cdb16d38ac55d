/// Event date and time formatting
pub mod datetime;
/// Telegram HTML escaping
pub mod html;
/// Recipient identity validation
pub mod validation;
