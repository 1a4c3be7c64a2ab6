use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::io::AsyncWrite;

use crate::config::Config;
use crate::files::buffered::reply_buffered;
use crate::files::path::RequestPath;
use crate::files::planner::{plan, Planned};
use crate::files::streaming::stream_file;
use crate::http::connection::Handler;
use crate::http::exchange::Exchange;
use crate::http::raw::RawTransport;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};

/// Read-only file service rooted at one directory.
#[derive(Debug, Clone)]
pub struct FileService {
    root: PathBuf,
    min_size_hint: u64,
}

/// One access-log line.
struct Access<'a> {
    method: &'a str,
    path: &'a RequestPath,
    status: StatusCode,
    file_error: Option<&'a io::Error>,
    reply_error: Option<&'a dyn std::fmt::Display>,
    cost: Duration,
    reply: Duration,
}

impl Access<'_> {
    fn emit(&self) {
        tracing::info!(
            method = self.method,
            path = %self.path,
            status = self.status.as_u16(),
            file_error = self.file_error.map(tracing::field::display),
            reply_error = self.reply_error.map(tracing::field::display),
            cost_us = self.cost.as_micros() as u64,
            reply_us = self.reply.as_micros() as u64,
            "Request served"
        );
    }
}

impl FileService {
    pub fn new(root: impl Into<PathBuf>, min_size_hint: u64) -> Self {
        Self {
            root: root.into(),
            min_size_hint,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.root.clone(), cfg.min_size_hint)
    }

    async fn handle_get<T>(&self, req: &Request, exchange: &mut Exchange<'_, T>) -> anyhow::Result<()>
    where
        T: RawTransport + AsyncWrite + Unpin + Send,
    {
        let start = Instant::now();
        let path = RequestPath::from_uri(req.uri());
        let full_path = path.under(&self.root);

        match plan(&full_path, self.min_size_hint).await {
            Planned::NotFound(e) => {
                let cost = start.elapsed();
                let res = exchange.reply(Response::not_found()).await;
                Access {
                    method: "get",
                    path: &path,
                    status: StatusCode::NotFound,
                    file_error: Some(&e),
                    reply_error: res.as_ref().err().map(|e| e as &dyn std::fmt::Display),
                    cost,
                    reply: start.elapsed() - cost,
                }
                .emit();
            }

            Planned::Buffered(mut file) => {
                let size = file.size();
                let buffered = reply_buffered(&mut file, size, path.file_name()).await;
                drop(file);

                let status = buffered.response.status;
                let cost = start.elapsed();
                let res = exchange.reply(buffered.response).await;
                Access {
                    method: "get",
                    path: &path,
                    status,
                    file_error: buffered.file_error.as_ref(),
                    reply_error: res.as_ref().err().map(|e| e as &dyn std::fmt::Display),
                    cost,
                    reply: start.elapsed() - cost,
                }
                .emit();
            }

            Planned::Streamed(mut file) => {
                let size = file.size();
                let cost = start.elapsed();
                let transport = exchange.take_over()?;
                let report = stream_file(&mut file, transport, size, path.file_name()).await;

                if !report.keep_alive() {
                    exchange.disable_keep_alive();
                }
                Access {
                    method: "get",
                    path: &path,
                    status: report.status(),
                    file_error: report.file_error(),
                    reply_error: report.push_error().map(|e| e as &dyn std::fmt::Display),
                    cost,
                    reply: start.elapsed() - cost,
                }
                .emit();
            }
        }

        Ok(())
    }

    /// HEAD is recognised but not implemented; no file is touched.
    async fn handle_head<T>(&self, req: &Request, exchange: &mut Exchange<'_, T>) -> anyhow::Result<()>
    where
        T: RawTransport + AsyncWrite + Unpin + Send,
    {
        self.reject(req, exchange, "head", Response::not_implemented()).await
    }

    /// Read-only service: every other method is refused.
    async fn handle_other<T>(&self, req: &Request, exchange: &mut Exchange<'_, T>) -> anyhow::Result<()>
    where
        T: RawTransport + AsyncWrite + Unpin + Send,
    {
        self.reject(req, exchange, req.method.as_str(), Response::method_not_allowed())
            .await
    }

    async fn reject<T>(
        &self,
        req: &Request,
        exchange: &mut Exchange<'_, T>,
        method: &str,
        response: Response,
    ) -> anyhow::Result<()>
    where
        T: RawTransport + AsyncWrite + Unpin + Send,
    {
        let start = Instant::now();
        let path = RequestPath::from_uri(req.uri());
        let status = response.status;

        let cost = start.elapsed();
        let res = exchange.reply(response).await;
        Access {
            method,
            path: &path,
            status,
            file_error: None,
            reply_error: res.as_ref().err().map(|e| e as &dyn std::fmt::Display),
            cost,
            reply: start.elapsed() - cost,
        }
        .emit();

        Ok(())
    }
}

impl Handler for FileService {
    async fn handle<T>(&self, req: &Request, exchange: &mut Exchange<'_, T>)
    where
        T: RawTransport + AsyncWrite + Unpin + Send,
    {
        let result = match req.method {
            Method::GET => self.handle_get(req, exchange).await,
            Method::HEAD => self.handle_head(req, exchange).await,
            _ => self.handle_other(req, exchange).await,
        };

        if let Err(e) = result {
            tracing::error!(
                method = req.method.as_str(),
                error = %e,
                "Request dispatch failed"
            );
        }
    }
}
