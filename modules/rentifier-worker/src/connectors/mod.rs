pub mod yad2;

pub use yad2::Yad2Connector;
