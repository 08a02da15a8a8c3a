mod integration;
mod lab;
mod topology;
