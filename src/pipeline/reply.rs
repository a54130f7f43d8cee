//! Fixed reply templates, one per category.

use crate::pipeline::types::Category;

pub const PRODUCTIVE_REPLY: &str = "Hello! Thank you for reaching out. We have received your \
     request and our team will get back to you as soon as possible.";

pub const NON_PRODUCTIVE_REPLY: &str =
    "Hello! Thank you for your message. No further action is required at this time.";

/// Template reply for a final category.
pub fn compose_reply(category: Category) -> &'static str {
    match category {
        Category::Productive => PRODUCTIVE_REPLY,
        Category::NonProductive => NON_PRODUCTIVE_REPLY,
    }
}
