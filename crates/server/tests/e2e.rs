use std::collections::HashSet;
use std::net::SocketAddr;

use axum::Router;
use configs::{AppConfig, StorageBackend};
use models::Blog;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use uuid::Uuid;

struct TestApp {
    base_url: String,
    data_dir: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    // isolated file-backed collections per test run
    let data_dir = format!("target/test-data/{}", Uuid::new_v4());
    let mut cfg = AppConfig::default();
    cfg.storage.backend = StorageBackend::File;
    cfg.storage.data_dir = data_dir.clone();

    let app: Router = server::startup::build_app(&cfg).await?;
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, data_dir })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().build().expect("reqwest client")
}

#[tokio::test]
async fn e2e_blog_flow_over_http() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c
        .post(format!("{}/api/blogs", app.base_url))
        .json(&json!({"title": "T", "content": "C", "author": "X"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let blog: Blog = res.json().await?;
    assert_eq!(blog.id, 1);

    let res = c.post(format!("{}/api/blogs/1/like", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let res = c
        .post(format!("{}/api/blogs/1/comment", app.base_url))
        .json(&json!({"author": "Y", "content": "hi"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let blogs: Vec<Blog> = c.get(format!("{}/api/blogs", app.base_url)).send().await?.json().await?;
    assert_eq!(blogs.len(), 1);
    assert_eq!(blogs[0].likes, 1);
    assert_eq!(blogs[0].comments[0].content, "hi");

    // the file backend persisted the mutation
    let on_disk: Vec<Blog> = serde_json::from_slice(&tokio::fs::read(format!("{}/blogs.json", app.data_dir)).await?)?;
    assert_eq!(on_disk, blogs);

    let res = c.delete(format!("{}/api/blogs/1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let res = c.delete(format!("{}/api/blogs/1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_signup_login_over_http() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let creds = json!({"username": "alice", "password": "p1"});

    let res = c.post(format!("{}/api/users?action=signup", app.base_url)).json(&creds).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let res = c.post(format!("{}/api/users", app.base_url)).json(&creds).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let res = c
        .post(format!("{}/api/users", app.base_url))
        .json(&json!({"username": "alice", "password": "nope"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);

    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn e2e_parallel_creates_get_distinct_ids() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let handles: Vec<_> = (0..25)
        .map(|i| {
            let c = c.clone();
            let url = format!("{}/api/blogs", app.base_url);
            tokio::spawn(async move {
                let res = c.post(url).json(&json!({"title": format!("t{i}")})).send().await?;
                anyhow::ensure!(res.status() == HttpStatusCode::CREATED, "status {}", res.status());
                Ok::<_, anyhow::Error>(res.json::<Blog>().await?.id)
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for h in handles {
        ids.insert(h.await??);
    }
    assert_eq!(ids, (1..=25).collect::<HashSet<u64>>());

    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}
