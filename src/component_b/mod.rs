//component B: HTTP serving
//Accepts one client at a time, classifies the request and answers from the shared snapshot
pub mod dispatcher;
pub mod response;
pub mod http_server;
