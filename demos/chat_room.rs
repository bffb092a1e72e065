//! Chat room example with direct and broadcast messages
//!
//! Run with: cargo run --example chat_room
//!
//! Admits a few users through the registry, gives each a mailbox and a
//! delivery task, then has several producers chat concurrently. Shuts down
//! when the script finishes or on Ctrl+C.
//!
//! Set `RUST_LOG=chat_router=trace` to see per-recipient drops.

use std::sync::Arc;
use std::time::Duration;

use chat_router::{Mailbox, Message, Router, RouterConfig, User, UserRegistry};
use tokio_util::sync::CancellationToken;

/// Delivery task: prints everything that lands in one mailbox
async fn deliver(mut mailbox: Mailbox) -> usize {
    let mut received = 0;
    while let Some(msg) = mailbox.recv().await {
        received += 1;
        let mode = if msg.is_broadcast() { "all" } else { "dm" };
        println!(
            "[{}] <{}> ({}) {}",
            mailbox.user_id(),
            msg.sender,
            mode,
            msg.content()
        );
        // Slow consumer; small mailboxes will drop under load
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    received
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chat_router=info".parse()?),
        )
        .init();

    let shutdown = CancellationToken::new();
    let registry = UserRegistry::with_cancellation(shutdown.clone());
    let router = Arc::new(Router::with_shutdown(
        RouterConfig::default().inbound_capacity(32),
        shutdown.clone(),
    ));

    let users = [
        User::new("alice", "Alice", "alice@example.com"),
        User::new("bob", "Bob", "bob@example.com"),
        User::new("carol", "Carol", "carol@example.org"),
        // Rejected: malformed email
        User::new("mallory", "Mallory", "mallory@nowhere"),
    ];

    let mut consumers = Vec::new();
    for user in users {
        let id = user.id.clone();
        if let Err(e) = registry.add_user(user).await {
            eprintln!("Not admitting {}: {}", id, e);
            continue;
        }
        // Bob gets a tiny mailbox to show drop-on-full
        let capacity = if id == "bob" { 2 } else { 64 };
        let mailbox = router.register(id.clone(), capacity).await?;
        consumers.push((id, tokio::spawn(deliver(mailbox))));
    }

    let loop_handle = router.spawn()?;

    let mut producers = Vec::new();
    for sender in ["alice", "bob", "carol"] {
        let router = Arc::clone(&router);
        producers.push(tokio::spawn(async move {
            for i in 0..5 {
                let msg = if i % 2 == 0 {
                    Message::broadcast(sender, format!("hello #{} from {}", i, sender))
                } else {
                    Message::direct(sender, "alice", format!("psst #{}", i))
                };
                if let Err(e) = router.submit(msg).await {
                    eprintln!("{} could not send: {}", sender, e);
                    return;
                }
            }
        }));
    }

    // Nobody is listening as "dave"; this is silently dropped
    router
        .submit(Message::direct("carol", "dave", "are you there?"))
        .await?;

    tokio::select! {
        _ = async {
            for producer in producers {
                let _ = producer.await;
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        } => {}
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
    }

    shutdown.cancel();
    router.closed().await;
    loop_handle.await?;

    for (id, consumer) in consumers {
        println!("{} received {} messages", id, consumer.await?);
    }

    let stats = router.stats();
    println!(
        "Routed {} messages: {} delivered, {} dropped (full), {} unroutable",
        stats.routed, stats.delivered, stats.dropped_full, stats.dropped_unroutable
    );

    Ok(())
}
