#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("http client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("serve: {0}")]
    Serve(#[source] std::io::Error),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
