pub mod capture_server;
