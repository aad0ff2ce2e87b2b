pub mod usage_service;
