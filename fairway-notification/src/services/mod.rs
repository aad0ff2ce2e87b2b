pub mod notification_service;
