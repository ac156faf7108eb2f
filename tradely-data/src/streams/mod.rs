/// Stream adapters used by the push subscriptions.
pub mod timeout;
