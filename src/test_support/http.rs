use httpmock::MockServer;

/// Start a fresh `httpmock::MockServer` instance standing in for a provider token endpoint.
pub fn start_mock_server() -> MockServer {
    MockServer::start()
}
