pub mod dnsx;
pub mod subfinder;
