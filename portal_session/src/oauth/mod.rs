mod flow;
mod params;


pub use flow::{OAuthCompletion, OAuthPhase};
pub use params::OAuthCallbackParams;
