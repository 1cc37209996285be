//! Concurrent mixed traffic against a single proxy instance.

use std::time::Instant;

use intercept_proxy::http::Verdict;
use reqwest::StatusCode;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mixed_traffic() {
    let upstream = common::start_echo_stub().await;
    let proxy = common::start_proxy(common::config_for(upstream.addr)).await;

    let concurrency = 16;
    let requests_per_task = 20;
    let total_requests = concurrency * requests_per_task;

    let client = common::client();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for task_id in 0..concurrency {
        let client = client.clone();
        let base = proxy.url("");
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            for i in 0..requests_per_task {
                let req_start = Instant::now();
                // Every third request hits the protected range.
                if i % 3 == 0 {
                    let res = client
                        .get(format!("{base}/api/services/app/%5BWebWhiteList%5D/GetAll"))
                        .send()
                        .await
                        .unwrap();
                    assert_eq!(res.status(), StatusCode::FORBIDDEN);
                } else {
                    let device = format!("{task_id}-{i}");
                    let res = client
                        .post(format!("{base}/api/echo"))
                        .header("content-type", "application/json")
                        .body(format!(r#"{{"deviceNumber":"{device}"}}"#))
                        .send()
                        .await
                        .unwrap();
                    assert_eq!(res.status(), StatusCode::OK);
                    // Each response carries its own rewritten body back.
                    assert_eq!(res.text().await.unwrap(), format!(r#"{{"dn":"{device}"}}"#));
                }
                latencies.push(req_start.elapsed());
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for task in tasks {
        all_latencies.extend(task.await.unwrap());
    }
    let duration = start.elapsed();

    assert_eq!(all_latencies.len(), total_requests);
    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p99 = all_latencies[(all_latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("P50 Latency:    {:?}", p50);
    println!("P99 Latency:    {:?}", p99);
    println!("-------------------------\n");

    let events = proxy.sink.events();
    assert_eq!(events.len(), total_requests);

    let blocked = events.iter().filter(|e| e.verdict == Verdict::Blocked).count();
    let blocked_per_task = (0..requests_per_task).filter(|i| i % 3 == 0).count();
    assert_eq!(blocked, concurrency * blocked_per_task);
    assert_eq!(upstream.calls(), total_requests - blocked);
}
