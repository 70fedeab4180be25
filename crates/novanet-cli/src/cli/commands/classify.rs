//! `novanet classify <message>` – show how a failure message is classified.

use novanet_core::{classify, Failure};

pub fn run_classify(message: &str, context: Option<&str>) {
    let e = classify(Failure::message(message), context);
    println!("kind:       {}", e.kind);
    println!("severity:   {}", e.severity);
    println!("retryable:  {}", e.retryable);
    println!("user:       {}", e.user_message);
    if let Some(ctx) = &e.context {
        println!("context:    {}", ctx);
    }
}
