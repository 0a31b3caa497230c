mod common;
mod repository;
mod routing;
