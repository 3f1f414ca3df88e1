//! Drives a full MCP session through the line transport.

use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::TcpStream;
use wordmcp::config::ServerConfig;
use wordmcp::mcp::{serve, McpServer, TcpTransport, MCP_PROTOCOL_VERSION};

fn request(id: u64, method: &str, params: Value) -> String {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }).to_string()
}

fn tool_call(id: u64, name: &str, arguments: Value) -> String {
    request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

fn run_session(root: &std::path::Path, lines: &[String]) -> Vec<Value> {
    let mut server = McpServer::new(ServerConfig::new(root).service());
    let input = lines.join("\n");
    let mut output = Vec::new();
    serve(&mut server, Cursor::new(input), &mut output).unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_document_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let lines = vec![
        request(
            1,
            "initialize",
            json!({
                "protocolVersion": MCP_PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": { "name": "test-client", "version": "1.0" }
            }),
        ),
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string(),
        request(2, "tools/list", json!({})),
        tool_call(3, "create_document", json!({ "filename": "minutes", "title": "Minutes" })),
        tool_call(4, "add_heading", json!({ "filename": "minutes", "text": "Attendees", "level": 2 })),
        tool_call(5, "write_text", json!({ "filename": "minutes", "text": "foo, and foo again" })),
        tool_call(6, "replace_text", json!({ "filename": "minutes", "find_text": "foo", "replace_text": "Kim" })),
        tool_call(7, "read_document", json!({ "filename": "minutes" })),
        tool_call(8, "get_document_info", json!({ "filename": "minutes.docx" })),
        tool_call(9, "list_documents", json!({})),
        tool_call(10, "copy_document", json!({ "source_filename": "minutes", "target_filename": "backup" })),
    ];

    let responses = run_session(dir.path(), &lines);
    assert_eq!(responses.len(), 10);
    for (resp, id) in responses.iter().zip([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]) {
        assert_eq!(resp["id"], json!(id));
        assert!(resp.get("error").is_none(), "unexpected error: {}", resp);
    }

    assert_eq!(responses[0]["result"]["protocolVersion"], json!(MCP_PROTOCOL_VERSION));
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 9);

    let created = &responses[2]["result"];
    assert_eq!(created["isError"], json!(false));
    let path = dir.path().join("minutes.docx");
    assert_eq!(created["structuredContent"]["path"], json!(path.display().to_string()));

    assert_eq!(responses[3]["result"]["structuredContent"]["level"], json!(2));
    assert_eq!(responses[4]["result"]["structuredContent"]["appended"], json!(true));
    assert_eq!(responses[5]["result"]["structuredContent"]["replacements"], json!(2));
    assert_eq!(
        responses[6]["result"]["structuredContent"]["text"],
        json!("Attendees\nKim, and Kim again")
    );

    let info = &responses[7]["result"]["structuredContent"];
    assert_eq!(info["title"], json!("Minutes"));
    assert_eq!(info["author"], json!(""));
    assert_eq!(info["heading_count"], json!(1));

    assert_eq!(
        responses[8]["result"]["structuredContent"]["documents"],
        json!(["minutes.docx"])
    );
    assert!(dir.path().join("backup.docx").is_file());

    // the text content mirrors the structured content
    let text = responses[5]["result"]["content"][0]["text"].as_str().unwrap();
    let parsed: Value = serde_json::from_str(text).unwrap();
    assert_eq!(parsed, responses[5]["result"]["structuredContent"]);
}

#[test]
fn test_errors_in_session() {
    let dir = tempfile::tempdir().unwrap();
    let lines = vec![
        "{broken".to_string(),
        tool_call(1, "read_document", json!({ "filename": "ghost" })),
        tool_call(2, "add_heading", json!({ "filename": "ghost", "text": "x", "level": 9 })),
        tool_call(3, "create_document", json!({})),
        request(4, "resources/list", json!({})),
    ];

    let responses = run_session(dir.path(), &lines);
    assert_eq!(responses.len(), 5);

    assert_eq!(responses[0]["error"]["code"], json!(-32700));

    assert_eq!(responses[1]["result"]["isError"], json!(true));
    assert_eq!(responses[1]["result"]["structuredContent"]["kind"], json!("not_found"));

    assert_eq!(
        responses[2]["result"]["structuredContent"]["kind"],
        json!("invalid_argument")
    );

    assert_eq!(responses[3]["error"]["code"], json!(-32602));
    assert_eq!(responses[4]["error"]["code"], json!(-32601));
}

#[test]
fn test_tcp_transport_serves_connection() {
    let dir = tempfile::tempdir().unwrap();
    let transport = TcpTransport::bind("127.0.0.1:0").unwrap();
    let addr = transport.local_addr().unwrap();
    let root = dir.path().to_path_buf();

    std::thread::spawn(move || {
        let mut server = McpServer::new(ServerConfig::new(root).service());
        let _ = transport.run(&mut server);
    });

    let mut stream = TcpStream::connect(addr).unwrap();
    writeln!(stream, "{}", request(1, "ping", json!({}))).unwrap();

    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    let resp: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(resp["id"], json!(1));
    assert_eq!(resp["result"], json!({}));
}
