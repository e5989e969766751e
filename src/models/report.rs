use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::Report as EyreReport;
use tracing::error;

pub type Result<T, E = Report> = std::result::Result<T, E>;

pub struct Report(EyreReport);

impl<E> From<E> for Report
where
    E: Into<EyreReport>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for Report {
    fn into_response(self) -> Response {
        error!("{:?}", self.0);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
