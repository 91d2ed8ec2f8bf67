pub mod application;
pub mod company;
pub mod job;
pub mod message;
pub mod notification;
pub mod payment;
pub mod student;
pub mod user;
