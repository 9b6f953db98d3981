// Test modules for gcdb








#[cfg(test)]
pub mod protocol_tests;

#[cfg(test)]
pub mod network_tests;
