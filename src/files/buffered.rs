use std::io;

use crate::files::planner::ChunkSource;
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// A small file's reply, plus the read error behind a 500 if there was one.
#[derive(Debug)]
pub struct BufferedReply {
    pub response: Response,
    pub file_error: Option<io::Error>,
}

/// Reads the whole file into a buffer of exactly `size` bytes.
///
/// A file that ends early is a read error rather than a short body.
pub async fn read_whole<S: ChunkSource>(source: &mut S, size: u64) -> io::Result<Vec<u8>> {
    let len = usize::try_from(size).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "file too large to buffer")
    })?;

    let mut body = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        let n = source.read_at(&mut body[filled..], filled as u64).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "file shrank while reading",
            ));
        }
        filled += n;
    }

    Ok(body)
}

/// Builds the single response for a small file.
///
/// The body buffer moves into the response, so it lives until the writer is done.
pub async fn reply_buffered<S: ChunkSource>(
    source: &mut S,
    size: u64,
    file_name: &str,
) -> BufferedReply {
    match read_whole(source, size).await {
        Ok(body) => BufferedReply {
            response: ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Disposition", file_name)
                .body(body)
                .build(),
            file_error: None,
        },
        Err(e) => BufferedReply {
            response: Response::internal_error(),
            file_error: Some(e),
        },
    }
}
