use sqlx::postgres::PgPoolOptions;
use std::env;

// Seeds a demo fleet and starter content for local development.
// Run with: cargo run --bin seed

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .connect(&database_url)
        .await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        println!("Fleet already seeded ({} cars); nothing to do", existing);
        return Ok(());
    }

    let fleet = [
        ("Rolls-Royce", "Cullinan", "Rolls-Royce Cullinan", "4,500", "28,000", "95,000", 5, 4),
        ("Lamborghini", "Urus", "Lamborghini Urus", "2,900", "18,500", "62,000", 5, 4),
        ("Ferrari", "488 Spider", "Ferrari 488 Spider", "3,200", "20,000", "68,000", 2, 2),
        ("Bentley", "Continental GT", "Bentley Continental GT", "2,400", "15,000", "52,000", 4, 2),
        ("Mercedes-Benz", "G63 AMG", "Mercedes-Benz G63 AMG", "2,100", "13,500", "46,000", 5, 4),
        ("McLaren", "720S", "McLaren 720S", "3,000", "19,000", "64,000", 2, 2),
    ];

    for (brand, model, title, daily, weekly, monthly, seats, doors) in fleet {
        sqlx::query(
            r#"
            INSERT INTO cars (brand, model, title, price_daily, price_weekly, price_monthly,
                              seats, doors, transmission)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'Automatic')
            "#,
        )
        .bind(brand)
        .bind(model)
        .bind(title)
        .bind(daily)
        .bind(weekly)
        .bind(monthly)
        .bind(seats)
        .bind(doors)
        .execute(&pool)
        .await?;
        println!("Seeded car: {}", title);
    }

    sqlx::query(
        r#"
        UPDATE contact_info
        SET phone = '+971 4 000 0000', email = 'bookings@luxride.ae',
            whatsapp = '+971 50 000 0000', address = 'Sheikh Zayed Road, Dubai',
            working_hours = 'Daily 09:00 - 21:00', updated_at = NOW()
        WHERE id = 1
        "#,
    )
    .execute(&pool)
    .await?;

    let faqs = [
        (
            "What documents do I need to rent a car?",
            "A valid driving licence, passport or Emirates ID, and a security deposit.",
            0,
        ),
        (
            "Is insurance included in the price?",
            "Comprehensive insurance is included with every rental.",
            1,
        ),
        (
            "Can I extend my rental?",
            "Yes, contact us before the rental ends and we will check availability.",
            2,
        ),
    ];
    for (question, answer, sort_order) in faqs {
        sqlx::query("INSERT INTO faqs (question, answer, sort_order) VALUES ($1, $2, $3)")
            .bind(question)
            .bind(answer)
            .bind(sort_order)
            .execute(&pool)
            .await?;
    }

    for (name, sort_order) in [
        ("Rolls-Royce", 0),
        ("Lamborghini", 1),
        ("Ferrari", 2),
        ("Bentley", 3),
        ("Mercedes-Benz", 4),
        ("McLaren", 5),
    ] {
        sqlx::query("INSERT INTO brands (name, sort_order) VALUES ($1, $2)")
            .bind(name)
            .bind(sort_order)
            .execute(&pool)
            .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO hero_slides (title, subtitle, image_url, cta_label, cta_url, sort_order)
        VALUES ('Drive the extraordinary', 'Luxury and supercar rentals in Dubai',
                '/images/hero/cullinan.jpg', 'Browse the fleet', '/cars', 0)
        "#,
    )
    .execute(&pool)
    .await?;

    println!("Seeding complete");

    Ok(())
}
