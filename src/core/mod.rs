// Domain-layer modules and shared errors/models
pub mod models {
    pub use crate::models::*;
}

pub mod prompts {
    pub use crate::prompts::*;
}

pub mod response_validator {
    pub use crate::response_validator::*;
}

pub mod errors {
    pub use crate::errors::*;
}
