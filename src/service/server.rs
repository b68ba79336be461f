use crate::error::{LedgerError, Result};
use crate::service::handlers::{LedgerService, Request, Response, STATUS_BAD_REQUEST};
use log::{error, info, warn};
use serde_json::json;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

const TCP_WRITE_TIMEOUT: u64 = 5000;
const TCP_READ_TIMEOUT: u64 = 30000;
/// Longest request line accepted, newline included
pub const MAX_REQUEST_LEN: u64 = 64 * 1024;

/// Line-delimited JSON server: one `Request` per line in, one `Response` per line out
pub struct Server {
    service: LedgerService,
}

impl Server {
    pub fn new(service: LedgerService) -> Server {
        Server { service }
    }

    pub fn bind(addr: &str) -> Result<TcpListener> {
        TcpListener::bind(addr)
            .map_err(|e| LedgerError::Network(format!("Failed to bind {addr}: {e}")))
    }

    pub fn run(&self, addr: &str) -> Result<()> {
        let listener = Self::bind(addr)?;
        self.serve(listener)
    }

    /// Accept connections forever, one thread per connection
    pub fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!("Ledger service listening on {local_addr}");

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("Failed to accept connection: {e}");
                    continue;
                }
            };
            let service = self.service.clone();
            thread::spawn(move || {
                if let Err(e) = handle_connection(&service, stream) {
                    error!("Connection error: {e}");
                }
            });
        }
        Ok(())
    }
}

fn handle_connection(service: &LedgerService, stream: TcpStream) -> Result<()> {
    let peer_addr = stream.peer_addr()?;
    stream.set_read_timeout(Some(Duration::from_millis(TCP_READ_TIMEOUT)))?;
    stream.set_write_timeout(Some(Duration::from_millis(TCP_WRITE_TIMEOUT)))?;
    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);

    loop {
        let mut line = String::new();
        let read = reader
            .by_ref()
            .take(MAX_REQUEST_LEN)
            .read_line(&mut line)?;
        if read == 0 {
            break;
        }
        if !line.ends_with('\n') && read as u64 == MAX_REQUEST_LEN {
            warn!("Request from {peer_addr} exceeds {MAX_REQUEST_LEN} bytes, closing");
            let response = Response {
                status: STATUS_BAD_REQUEST,
                body: json!({ "message": "request too long" }),
            };
            write_response(&mut writer, &response)?;
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => service.handle(&request),
            Err(e) => {
                warn!("Bad request from {peer_addr}: {e}");
                Response {
                    status: STATUS_BAD_REQUEST,
                    body: json!({ "message": format!("invalid request: {e}") }),
                }
            }
        };
        write_response(&mut writer, &response)?;
    }
    Ok(())
}

fn write_response(writer: &mut TcpStream, response: &Response) -> Result<()> {
    let mut payload = serde_json::to_vec(response)?;
    payload.push(b'\n');
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::handlers::{STATUS_CREATED, STATUS_OK};
    use crate::testnet::create_test_blockchain;
    use std::sync::Arc;

    fn roundtrip(reader: &mut BufReader<TcpStream>, writer: &mut TcpStream, line: &str) -> Response {
        writer.write_all(line.as_bytes()).unwrap();
        writer.write_all(b"\n").unwrap();
        let mut reply = String::new();
        reader.read_line(&mut reply).unwrap();
        serde_json::from_str(&reply).unwrap()
    }

    #[test]
    fn test_requests_over_tcp() {
        let (blockchain, _) = create_test_blockchain("miner");
        let server = Server::new(LedgerService::new(Arc::new(blockchain)));
        let listener = Server::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || server.serve(listener));

        let mut writer = TcpStream::connect(addr).unwrap();
        let mut reader = BufReader::new(writer.try_clone().unwrap());

        let response = roundtrip(
            &mut reader,
            &mut writer,
            r#"{"op": "post_transaction", "sender_blockchain_address": "THE BLOCKCHAIN", "recipient_blockchain_address": "bob", "value": 1.5}"#,
        );
        assert_eq!(response.status, STATUS_CREATED);

        let response = roundtrip(&mut reader, &mut writer, r#"{"op": "post_mine"}"#);
        assert_eq!(response.status, STATUS_OK);

        let response = roundtrip(
            &mut reader,
            &mut writer,
            r#"{"op": "get_balance", "address": "bob"}"#,
        );
        assert_eq!(response.body["amount"], json!(1.5));

        let response = roundtrip(&mut reader, &mut writer, "not json");
        assert_eq!(response.status, STATUS_BAD_REQUEST);
    }

    #[test]
    fn test_overlong_request_rejected_and_closed() {
        let (blockchain, _) = create_test_blockchain("miner");
        let server = Server::new(LedgerService::new(Arc::new(blockchain)));
        let listener = Server::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || server.serve(listener));

        let mut writer = TcpStream::connect(addr).unwrap();
        let mut reader = BufReader::new(writer.try_clone().unwrap());
        writer
            .write_all(&vec![b'a'; MAX_REQUEST_LEN as usize])
            .unwrap();

        let mut reply = String::new();
        reader.read_line(&mut reply).unwrap();
        let response: Response = serde_json::from_str(&reply).unwrap();
        assert_eq!(response.status, STATUS_BAD_REQUEST);

        // the server hangs up instead of waiting for the rest of the line
        reply.clear();
        assert_eq!(reader.read_line(&mut reply).unwrap(), 0);
    }
}
