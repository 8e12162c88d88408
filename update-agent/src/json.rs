use std::io;

use serde::Deserialize;
use serde_json::Deserializer;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to deserialize")]
    Deserialize(#[source] serde_path_to_error::Error<serde_json::Error>),
}

pub fn deserialize<'de, R, T>(reader: R) -> Result<T, Error>
where
    R: io::Read,
    T: Deserialize<'de>,
{
    let json_deserializer = &mut Deserializer::from_reader(reader);
    serde_path_to_error::deserialize(json_deserializer).map_err(Error::Deserialize)
}
