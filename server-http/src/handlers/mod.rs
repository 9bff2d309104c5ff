pub mod faqs;
pub mod health;

pub use faqs::{create_faq, delete_faq, get_faq, list_faqs, update_faq};
pub use health::{health_check, index};
