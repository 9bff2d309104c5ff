mod gateway;
mod google;

pub use gateway::TranslationGateway;
pub use google::GoogleTranslator;
