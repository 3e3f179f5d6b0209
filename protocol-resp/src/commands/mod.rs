//! Typed request constructors.
//!
//! Each constructor is a thin wrapper over the generic [`Request`] builder:
//! it names the command token, lays the arguments out in wire order and marks
//! which of them are partition keys. None of them encode anything themselves.
//!
//! [`Request`]: crate::Request

mod geo;
mod hashes;
mod keys;
mod lists;
mod pubsub;
mod server;
mod sets;
mod sorted_sets;
mod strings;
mod transactions;

pub use geo::GeoRadiusOptions;
pub use keys::ScanOptions;
pub use sorted_sets::{ZAddOptions, ZStoreOptions};
pub use strings::SetOptions;

#[cfg(test)]
pub(crate) mod test_util {
    use crate::{Request, Value};

    /// Encode `req` and return its frames as strings plus its partition keys.
    pub fn wire(req: Request<'_>) -> (Vec<String>, Vec<String>) {
        let encoded = req.encode().unwrap();
        let (value, _) = Value::parse(encoded.as_bytes()).unwrap();
        let frames = value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| String::from_utf8(v.as_bytes().unwrap().to_vec()).unwrap())
            .collect();
        let keys = encoded
            .partition()
            .keys()
            .iter()
            .map(|k| String::from_utf8(k.to_vec()).unwrap())
            .collect();
        (frames, keys)
    }
}
