pub mod constants;
pub mod object_name;

#[cfg(test)]
pub(crate) mod mock_api;
