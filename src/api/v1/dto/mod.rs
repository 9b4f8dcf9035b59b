pub mod proxy_event;
