//! Shared test fixtures for the sales dashboard integration tests.
//!
//! Provides `sample_records()`, a small hand-written collection covering
//! several sellers, locations, categories and months, and `sale()` for
//! building individual records. `serve_once()` stands in for the sales API.

#![allow(dead_code)]

use chrono::NaiveDate;
use sales_dashboard::{Record, RecordCollection};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// Build a record with the fields most tests care about; the rest get
/// plausible fixed values.
pub fn sale(
    product: &str,
    category: &str,
    price: f64,
    date: (i32, u32, u32),
    seller: &str,
    location: &str,
) -> Record {
    let (lat, lon) = coordinates(location);
    Record {
        product: product.to_string(),
        category: category.to_string(),
        price,
        freight: (price * 0.05 * 100.0).round() / 100.0,
        purchase_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        seller: seller.to_string(),
        location: location.to_string(),
        rating: 4,
        payment_type: "cartao_credito".to_string(),
        installments: 1,
        latitude: lat,
        longitude: lon,
    }
}

fn coordinates(location: &str) -> (f64, f64) {
    match location {
        "SP" => (-22.19, -48.79),
        "RJ" => (-22.25, -42.66),
        "MG" => (-18.10, -44.38),
        "BA" => (-13.29, -41.71),
        _ => (-15.78, -47.93),
    }
}

/// Ten sales across four sellers, four locations and three categories,
/// spanning January to April 2021 (February has no sales).
pub fn sample_records() -> RecordCollection {
    let mut records = vec![
        sale("Modelagem preditiva", "livros", 92.45, (2021, 1, 1), "Alice", "BA"),
        sale("Iphone 15 Pro", "eletronicos", 4500.0, (2021, 1, 5), "Bruno", "SP"),
        sale("Cadeira de escritorio", "moveis", 350.0, (2021, 1, 20), "Alice", "SP"),
        sale("Smart TV", "eletronicos", 2300.0, (2021, 3, 2), "Carla", "RJ"),
        sale("Dashboards com Power BI", "livros", 60.0, (2021, 3, 10), "Diego", "MG"),
        sale("Mesa de jantar", "moveis", 1200.0, (2021, 3, 15), "Bruno", "RJ"),
        sale("Fone de ouvido", "eletronicos", 150.0, (2021, 3, 31), "Alice", "SP"),
        sale("Guarda roupas", "moveis", 800.0, (2021, 4, 2), "Carla", "MG"),
        sale("Iniciando em programacao", "livros", 45.0, (2021, 4, 18), "Diego", "BA"),
        sale("Celular ABXY", "eletronicos", 1100.0, (2021, 4, 30), "Bruno", "SP"),
    ];
    records[3].rating = 5;
    records[4].rating = 2;
    records[5].installments = 10;
    records[7].payment_type = "boleto".to_string();
    records[9].installments = 6;
    RecordCollection::new(records)
}

/// The API payload for two sales, exactly as the endpoint sends it.
pub const SAMPLE_JSON: &str = r#"[
  {
    "Produto": "Modelagem preditiva",
    "Categoria do Produto": "livros",
    "Preço": 92.45,
    "Frete": 5.6096965236,
    "Data da Compra": "01/01/2020",
    "Vendedor": "Thiago Silva",
    "Local da compra": "BA",
    "Avaliação da compra": 1,
    "Tipo de pagamento": "cartao_credito",
    "Quantidade de parcelas": 3,
    "lat": -13.29,
    "lon": -41.71
  },
  {
    "Produto": "Iphone 15 Pro",
    "Categoria do Produto": "eletronicos",
    "Preço": 4500,
    "Frete": 240.5,
    "Data da Compra": "31/12/2022",
    "Vendedor": "Mariana Ferreira",
    "Local da compra": "SP",
    "Avaliação da compra": 5,
    "Tipo de pagamento": "boleto",
    "Quantidade de parcelas": 1,
    "lat": -22.19,
    "lon": -48.79
  }
]"#;

/// Answer a single HTTP request on a local port with `body` as JSON.
///
/// Returns the endpoint URL and a handle yielding the request line received.
pub fn serve_once(body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/produtos", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();

        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (url, handle)
}
