//! Control sessions backed by `suppaftp`

use crate::connection::{Connector, ControlSession, FaultKind, SessionError, SessionResult};
use std::io::{Read, Write};
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, Status};
use tracing::trace;

fn classify(error: FtpError) -> SessionError {
    match error {
        FtpError::ConnectionError(io) => SessionError::from_io(&io),
        FtpError::UnexpectedResponse(response) => SessionError::from_reply(
            response.status.code(),
            &String::from_utf8_lossy(&response.body),
        ),
        FtpError::BadResponse => SessionError::new(FaultKind::MalformedReply, "bad response"),
        other => SessionError::new(FaultKind::PermanentReply, other.to_string()),
    }
}

/// Opens plain FTP sessions over TCP
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppaConnector;

impl SuppaConnector {
    fn resolve(host: &str, port: u16) -> SessionResult<SocketAddr> {
        (host, port)
            .to_socket_addrs()
            .map_err(|e| SessionError::from_io(&e))?
            .next()
            .ok_or_else(|| {
                SessionError::new(
                    FaultKind::Io,
                    format!("{}:{} did not resolve to any address", host, port),
                )
            })
    }
}

impl Connector for SuppaConnector {
    type Session = SuppaSession;

    fn open(&self, host: &str, port: u16, timeout: Duration) -> SessionResult<SuppaSession> {
        let address = Self::resolve(host, port)?;
        let stream = FtpStream::connect_timeout(address, timeout).map_err(classify)?;

        let socket = stream.get_ref();
        socket
            .set_read_timeout(Some(timeout))
            .and_then(|()| socket.set_write_timeout(Some(timeout)))
            .map_err(|e| SessionError::from_io(&e))?;

        Ok(SuppaSession { stream })
    }
}

/// One `suppaftp` control connection
pub struct SuppaSession {
    stream: FtpStream,
}

impl ControlSession for SuppaSession {
    fn login(&mut self, username: &str, password: &str) -> SessionResult<()> {
        self.stream.login(username, password).map_err(classify)
    }

    fn cwd(&mut self, path: &str) -> SessionResult<()> {
        self.stream.cwd(path).map_err(classify)
    }

    fn binary_mode(&mut self) -> SessionResult<()> {
        self.stream
            .transfer_type(FileType::Binary)
            .map_err(classify)
    }

    fn list_facts(&mut self) -> SessionResult<Vec<String>> {
        self.stream.mlsd(None).map_err(classify)
    }

    fn retrieve(
        &mut self,
        name: &str,
        offset: u64,
        sink: &mut dyn Write,
        block_size: usize,
        on_chunk: &mut dyn FnMut(u64),
    ) -> SessionResult<u64> {
        if offset > 0 {
            let offset = usize::try_from(offset).map_err(|_| {
                SessionError::new(FaultKind::MalformedReply, "resume offset out of range")
            })?;
            self.stream.resume_transfer(offset).map_err(classify)?;
        }

        let mut data = self.stream.retr_as_stream(name).map_err(classify)?;
        let mut buffer = vec![0_u8; block_size.max(1)];
        let mut written = 0_u64;

        loop {
            let read = data.read(&mut buffer).map_err(|e| SessionError::from_io(&e))?;
            if read == 0 {
                break;
            }
            sink.write_all(&buffer[..read])
                .map_err(|e| SessionError::local(&e))?;
            written += read as u64;
            on_chunk(read as u64);
        }
        trace!("{}: {} bytes from offset {}", name, written, offset);

        self.stream.finalize_retr_stream(data).map_err(classify)?;
        Ok(written)
    }

    fn command(&mut self, line: &str) -> SessionResult<String> {
        let response = self
            .stream
            .custom_command(
                line,
                &[Status::CommandOk, Status::File, Status::RequestedFileActionOk],
            )
            .map_err(classify)?;
        Ok(String::from_utf8_lossy(&response.body).into_owned())
    }

    fn quit(&mut self) -> SessionResult<()> {
        self.stream.quit().map_err(classify)
    }
}
