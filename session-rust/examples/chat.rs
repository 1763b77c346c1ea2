use dotenvy::dotenv;
use drivegen_session::ChatSession;
use std::io::{self, BufRead, Write};

mod common;

#[tokio::main]
async fn main() {
    dotenv().ok();
    common::init_tracing();

    let session = ChatSession::new(common::get_transport());
    println!("{}", session.transcript()[0].content);
    println!("Try one of:");
    for question in ChatSession::suggested_questions() {
        println!("  - {question}");
    }

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap() == 0 {
            break;
        }
        match line.trim() {
            "/clear" => {
                session.clear();
                println!("{}", session.transcript()[0].content);
            }
            "" => {}
            "/quit" => break,
            message => {
                let transcript = session.send(message).await;
                if let Some(reply) = transcript.last() {
                    println!("{}", reply.content);
                }
            }
        }
    }
}
