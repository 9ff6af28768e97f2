//! Static company copy shown in the sidebar

pub const TITLE: &str = "INVINCIX";
/// Heading of the chat banner
pub const BANNER_TITLE: &str = "💬 INVINCIX Chatbot";
pub const TAGLINE: &str = "Simplicity is our culture and simplification is what we do";

pub const ABOUT: &str = "**Mission**: Digitize 500+ startups

**Core Values**:
- 🤝 Engage
- 💡 Innovate
- 🚀 Invent
- ⭐ Excel";

pub const SERVICES: &str = "- Software Development
- Product Engineering
- Mobile Apps (iOS/Android)
- Data Analytics
- Cloud Solutions
- IoT & Drone Solutions";

pub const PRODUCTS: &str = "- **Xprodedge**: Product innovation
- **DigiStack**: Service automation
- **Zikshaa**: Mentorship platform
- **AD4P**: Application development";

pub const CONTACT: &str = "📧 info@invincix.com
📱 +91 674 297 2316
🌐 [invincix.com](https://invincix.com)";

/// (heading, markdown body) in display order
pub const SECTIONS: [(&str, &str); 4] = [
    ("🎯 About INVINCIX", ABOUT),
    ("🛠️ Our Services", SERVICES),
    ("📦 Our Products", PRODUCTS),
    ("📞 Contact Us", CONTACT),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::markdown::{parse_blocks, Block};

    #[test]
    fn test_services_render_as_one_list() {
        match &parse_blocks(SERVICES)[..] {
            [Block::BulletList(items)] => assert_eq!(items.len(), 6),
            other => panic!("unexpected blocks: {other:?}"),
        }
    }

    #[test]
    fn test_section_headings() {
        let headings: Vec<&str> = SECTIONS.iter().map(|(heading, _)| *heading).collect();
        assert_eq!(
            headings,
            vec!["🎯 About INVINCIX", "🛠️ Our Services", "📦 Our Products", "📞 Contact Us"]
        );
        assert_eq!(BANNER_TITLE, "💬 INVINCIX Chatbot");
    }

    #[test]
    fn test_core_values() {
        let blocks = parse_blocks(ABOUT);
        assert_eq!(
            blocks.last(),
            Some(&Block::BulletList(vec![
                "🤝 Engage".to_string(),
                "💡 Innovate".to_string(),
                "🚀 Invent".to_string(),
                "⭐ Excel".to_string(),
            ]))
        );
    }

    #[test]
    fn test_contact_lines_stay_together() {
        match &parse_blocks(CONTACT)[..] {
            [Block::Paragraph(lines)] => assert_eq!(lines.len(), 3),
            other => panic!("unexpected blocks: {other:?}"),
        }
    }
}
