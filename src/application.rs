pub mod transfer;
pub mod transfer_error;
