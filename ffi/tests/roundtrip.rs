//! End-to-end test of the C surface against the live mock server.
//!
//! Drives the same lifecycle a C caller would: init from a config struct,
//! create an inbox, send and list messages, release every returned record
//! through the free functions, destroy the handle.

use std::ffi::{CStr, CString};
use std::ptr::{null, null_mut};

use agentmail_ffi::types::*;
use agentmail_ffi::*;

/// Start the mock server on a random port and return its base URL.
fn start_mock_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

unsafe fn read_str(ptr: *const std::ffi::c_char) -> String {
    assert!(!ptr.is_null(), "expected a populated string field");
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
}

#[test]
fn c_surface_lifecycle() {
    let base_url = start_mock_server();

    let api_key = CString::new("test-key").unwrap();
    let base_url_c = CString::new(base_url).unwrap();
    let config = AgentmailConfig {
        api_key: api_key.as_ptr(),
        base_url: base_url_c.as_ptr(),
        timeout_ms: 5000,
        enable_logging: false,
        ctx: null_mut(),
    };

    let mut handle: *mut AgentmailClient = null_mut();
    assert!(matches!(
        agentmail_init(&config, &mut handle),
        AgentmailErr::None
    ));
    assert!(!handle.is_null());

    // Create an inbox with a name and metadata.
    let name = CString::new("C Device").unwrap();
    let metadata = CString::new(r#"{"device_id":"abc123"}"#).unwrap();
    let options = AgentmailInboxOptions {
        name: name.as_ptr(),
        metadata: metadata.as_ptr(),
    };
    let mut inbox = AgentmailInbox::empty();
    assert!(matches!(
        agentmail_inbox_create(handle, &options, &mut inbox),
        AgentmailErr::None
    ));
    let inbox_id = unsafe { read_str(inbox.inbox_id) };
    assert!(inbox_id.ends_with("@agentmail.to"));
    assert_eq!(unsafe { read_str(inbox.name) }, "C Device");
    assert_eq!(
        unsafe { read_str(inbox.metadata) },
        r#"{"device_id":"abc123"}"#
    );
    agentmail_inbox_free(&mut inbox);

    // Getting an unknown inbox reports NotFound and leaves the record zeroed.
    let missing = CString::new("missing@agentmail.to").unwrap();
    let mut absent = AgentmailInbox::empty();
    assert!(matches!(
        agentmail_inbox_get(handle, missing.as_ptr(), &mut absent),
        AgentmailErr::NotFound
    ));
    assert!(absent.inbox_id.is_null());

    // List inboxes: one record.
    let mut inbox_list = AgentmailInboxList::empty();
    assert!(matches!(
        agentmail_inbox_list(handle, 0, null(), &mut inbox_list),
        AgentmailErr::None
    ));
    assert_eq!(inbox_list.count, 1);
    assert!(inbox_list.next_cursor.is_null());
    let listed = unsafe { &*inbox_list.inboxes };
    assert_eq!(unsafe { read_str(listed.inbox_id) }, inbox_id);
    agentmail_inbox_list_free(&mut inbox_list);

    // Send a message.
    let inbox_id_c = CString::new(inbox_id.clone()).unwrap();
    let to = CString::new("user@example.com").unwrap();
    let subject = CString::new("Hello").unwrap();
    let body_text = CString::new("Hi from C").unwrap();
    let send_options = AgentmailSendOptions {
        from: inbox_id_c.as_ptr(),
        to: to.as_ptr(),
        subject: subject.as_ptr(),
        body_text: body_text.as_ptr(),
        body_html: null(),
        thread_id: null(),
        reply_to: null(),
        cc: null(),
        cc_count: 0,
        bcc: null(),
        bcc_count: 0,
    };
    let mut message_id: *mut std::ffi::c_char = null_mut();
    assert!(matches!(
        agentmail_send(handle, &send_options, &mut message_id),
        AgentmailErr::None
    ));
    let message_id_str = unsafe { read_str(message_id) };
    assert!(message_id_str.starts_with("msg_"));

    // List messages and inspect the decoded record.
    let query = AgentmailMessageQuery {
        limit: 10,
        cursor: null(),
        unread_only: false,
        thread_id: null(),
    };
    let mut message_list = AgentmailMessageList::empty();
    assert!(matches!(
        agentmail_messages_list(handle, inbox_id_c.as_ptr(), &query, &mut message_list),
        AgentmailErr::None
    ));
    assert_eq!(message_list.count, 1);
    assert_eq!(message_list.total, 1);
    let listed = unsafe { &*message_list.messages };
    assert_eq!(unsafe { read_str(listed.message_id) }, message_id_str);
    assert_eq!(unsafe { read_str(listed.text) }, "Hi from C");
    assert!(!listed.is_read);
    assert!(listed.html.is_null());
    agentmail_message_list_free(&mut message_list);

    // Mark read, then fetch and verify.
    let message_id_c = CString::new(message_id_str.clone()).unwrap();
    assert!(matches!(
        agentmail_message_mark_read(handle, inbox_id_c.as_ptr(), message_id_c.as_ptr(), true),
        AgentmailErr::None
    ));
    let mut message = AgentmailMessage::empty();
    assert!(matches!(
        agentmail_message_get(handle, inbox_id_c.as_ptr(), message_id_c.as_ptr(), &mut message),
        AgentmailErr::None
    ));
    assert!(message.is_read);
    agentmail_message_free(&mut message);

    // Raw MIME.
    let mut raw: *mut std::ffi::c_char = null_mut();
    let mut raw_size: usize = 0;
    assert!(matches!(
        agentmail_message_get_raw(
            handle,
            inbox_id_c.as_ptr(),
            message_id_c.as_ptr(),
            &mut raw,
            &mut raw_size,
        ),
        AgentmailErr::None
    ));
    let raw_str = unsafe { read_str(raw) };
    assert_eq!(raw_str.len(), raw_size);
    assert!(raw_str.contains("Subject: Hello"));
    agentmail_string_free(raw);

    // Reply joins the thread.
    let reply_text = CString::new("Thanks!").unwrap();
    let reply_options = AgentmailSendOptions {
        from: null(),
        to: null(),
        subject: null(),
        body_text: reply_text.as_ptr(),
        body_html: null(),
        thread_id: null(),
        reply_to: null(),
        cc: null(),
        cc_count: 0,
        bcc: null(),
        bcc_count: 0,
    };
    let mut reply_id: *mut std::ffi::c_char = null_mut();
    assert!(matches!(
        agentmail_send_reply(
            handle,
            inbox_id_c.as_ptr(),
            message_id_c.as_ptr(),
            &reply_options,
            &mut reply_id,
        ),
        AgentmailErr::None
    ));
    assert!(!reply_id.is_null());
    agentmail_string_free(reply_id);

    // Delete the message and the inbox; a second delete reports NotFound.
    assert!(matches!(
        agentmail_message_delete(handle, inbox_id_c.as_ptr(), message_id_c.as_ptr()),
        AgentmailErr::None
    ));
    assert!(matches!(
        agentmail_message_delete(handle, inbox_id_c.as_ptr(), message_id_c.as_ptr()),
        AgentmailErr::NotFound
    ));
    assert!(matches!(
        agentmail_inbox_delete(handle, inbox_id_c.as_ptr()),
        AgentmailErr::None
    ));

    agentmail_string_free(message_id);
    assert!(matches!(agentmail_destroy(handle), AgentmailErr::None));
}
