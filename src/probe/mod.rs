pub mod httpx;
pub mod naabu;
