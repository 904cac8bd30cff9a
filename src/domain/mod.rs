mod line;
mod money;
mod party;
mod product;
mod quote;
mod sale;

pub use line::*;
pub use money::*;
pub use party::*;
pub use product::*;
pub use quote::*;
pub use sale::*;
