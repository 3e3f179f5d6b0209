//! TCP transport on tokio.

use bytes::{Bytes, BytesMut};
use resp_proto::{FrameScanner, ParseOptions, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::transport::{Connection, Connector};
use crate::Error;

const READ_BUFFER_SIZE: usize = 16 * 1024;

/// Opens plain TCP connections.
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    options: ParseOptions,
}

impl TcpConnector {
    /// Use custom limits when parsing replies.
    pub fn with_parse_options(options: ParseOptions) -> Self {
        Self { options }
    }
}

impl Connector for TcpConnector {
    type Conn = TcpConnection;

    async fn connect(&self, address: &str) -> Result<TcpConnection, Error> {
        let stream = TcpStream::connect(address).await?;
        stream.set_nodelay(true)?;
        Ok(TcpConnection::new(stream, self.options))
    }
}

/// A connection that buffers reads until a full reply is available.
///
/// Reply boundaries are found with a [`FrameScanner`] that keeps its place
/// between reads; each reply is parsed once, after its last byte arrives.
pub struct TcpConnection {
    stream: TcpStream,
    buf: BytesMut,
    scanner: FrameScanner,
    options: ParseOptions,
}

impl TcpConnection {
    pub fn new(stream: TcpStream, options: ParseOptions) -> Self {
        Self {
            stream,
            buf: BytesMut::with_capacity(READ_BUFFER_SIZE),
            scanner: FrameScanner::new(),
            options,
        }
    }

    /// Take one complete reply off the read buffer, if there is one. Bulk
    /// payloads in the returned value share the read buffer's allocation.
    fn try_parse(&mut self) -> Result<Option<Value>, Error> {
        let Some(len) = self.scanner.scan(&self.buf, &self.options)? else {
            return Ok(None);
        };
        let frame = self.buf.split_to(len).freeze();
        let (value, _) = Value::parse_bytes_with_options(frame, &self.options)?;
        Ok(Some(value))
    }
}

impl Connection for TcpConnection {
    async fn send(&mut self, frame: Bytes) -> Result<(), Error> {
        self.stream.write_all(&frame).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Value, Error> {
        loop {
            if let Some(value) = self.try_parse()? {
                return Ok(value);
            }
            self.buf.reserve(READ_BUFFER_SIZE);
            let n = self.stream.read_buf(&mut self.buf).await?;
            if n == 0 {
                return Err(Error::ConnectionClosed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_round_trip_with_split_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 64];
            let n = socket.read(&mut request).await.unwrap();
            request.truncate(n);

            let reply = Value::Array(vec![
                Value::bulk_string(b"hello"),
                Value::Integer(7),
                Value::Null,
            ])
            .to_bytes();
            // Two replies, the first split across writes.
            socket.write_all(&reply[..5]).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            socket.write_all(&reply[5..]).await.unwrap();
            socket.write_all(b"+OK\r\n").await.unwrap();
            request
        });

        let mut conn = TcpConnector::default().connect(&address).await.unwrap();
        let frame = resp_proto::Request::ping().encode().unwrap().into_parts().0;
        conn.send(frame).await.unwrap();

        let first = conn.recv().await.unwrap();
        assert_eq!(
            first,
            Value::Array(vec![
                Value::bulk_string(b"hello"),
                Value::Integer(7),
                Value::Null,
            ])
        );
        assert_eq!(conn.recv().await.unwrap(), Value::simple_string(b"OK"));
        assert_eq!(server.await.unwrap(), b"*1\r\n$4\r\nPING\r\n");
    }

    #[tokio::test]
    async fn test_large_reply_in_small_writes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let payload = vec![b'x'; 256 * 1024];
        let reply = Value::Array(vec![
            Value::bulk_string(&payload),
            Value::bulk_string(&payload[..1000]),
        ])
        .to_bytes();

        let expected = reply.clone();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            for chunk in expected.chunks(1024) {
                socket.write_all(chunk).await.unwrap();
            }
            socket.write_all(b":1\r\n").await.unwrap();
        });

        let mut conn = TcpConnector::default().connect(&address).await.unwrap();
        let value = conn.recv().await.unwrap();
        let elements = value.as_array().unwrap();
        assert_eq!(elements[0].as_bytes().unwrap().len(), payload.len());
        assert_eq!(elements[1].as_bytes().unwrap(), &payload[..1000]);
        assert_eq!(conn.recv().await.unwrap(), Value::Integer(1));
    }

    #[tokio::test]
    async fn test_closed_by_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let mut conn = TcpConnector::default().connect(&address).await.unwrap();
        assert!(matches!(conn.recv().await, Err(Error::ConnectionClosed | Error::Io(_))));
    }
}
