pub mod callback;
pub mod handle_store;
pub mod orchestration;
