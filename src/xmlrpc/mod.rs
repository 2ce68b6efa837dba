mod codec;
mod transport;
mod value;

pub use codec::{decode_response, encode_call, encode_fault, encode_response};
pub use transport::{DocumentFetcher, HttpTransport, RpcRequest, RpcTransport};
pub use value::{structure, Value};
