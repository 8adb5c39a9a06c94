pub mod api_service;
pub mod availability_service;
pub mod search_service;
pub mod session_service;
pub mod storage_service;
pub mod validation_service;
