/// Root endpoint
///
/// ```text
/// GET /
/// ```
///
/// Responds with `Server is running!` as plain text.
pub async fn index() -> &'static str {
    "Server is running!"
}
