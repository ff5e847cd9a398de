//! Greeting sent for `/start` and `/help`.

use telegram_bot::User;
use teloxide::utils::html;

/// Links shown in the greeting: (emoji, label, URL).
const CONTACT_LINKS: [(&str, &str, &str); 4] = [
    ("🔗", "Telegram Channel", "https://t.me/fikrboy"),
    ("🎥", "YouTube", "https://youtube.com/@Sobirjon-Abdumajid"),
    ("💼", "LinkedIn", "https://linkedin.com/in/Sobirjon-Abdumajidov"),
    ("💻", "GitHub", "https://github.com/SobirjonAbdumajid"),
];

const AUTHOR: &str = "Sobirjon Abdumajidov";

/// Builds the HTML greeting for `user`. The name is escaped, so any display name is safe.
pub fn welcome_html(user: &User) -> String {
    let links = CONTACT_LINKS
        .iter()
        .map(|(emoji, label, url)| format!("{} {}", emoji, html::link(url, label)))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Hello {}!\n\n\
         This bot is made by {}.\n\
         Check out my work and profiles below:\n\n\
         {}\n\n\
         How can I assist you today?",
        html::bold(&html::escape(&user.full_name())),
        AUTHOR,
        links
    )
}
