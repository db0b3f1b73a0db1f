use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use muster::auth::{self, rate_limit::RateLimiter};
use muster::roster::{RosterRegistry, hub};
use muster::{audit, db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    // Ensure data directory exists
    std::fs::create_dir_all("data").expect("Failed to create data directory");

    // Initialize database
    let pool = db::init_pool("data/muster.db");
    db::run_migrations(&pool);

    // Seed the default owner account if the database is empty
    let admin_hash =
        auth::password::hash_password("admin123").expect("Failed to hash default password");
    db::seed_admin(&pool, &admin_hash);

    if std::env::var("MUSTER_SEED_DEMO").as_deref() == Ok("1") {
        db::seed_demo(&pool, &admin_hash);
    }

    // Clean up old audit entries based on retention policy
    {
        let conn = pool.get().expect("Failed to get connection for audit cleanup");
        audit::cleanup_old_entries(&conn);
    }

    // Session encryption key — load from SESSION_KEY env var for persistent sessions across restarts
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!(
                "SESSION_KEY too short ({} bytes, need 64+) — generating random key",
                val.len()
            );
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let rate_limiter = RateLimiter::new();
    let roster_registry = web::Data::new(RosterRegistry::new());
    let roster_hub = web::Data::new(hub::new_hub());

    log::info!("Starting server at http://127.0.0.1:8080");

    HttpServer::new(move || {
        let session_mw =
            SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                .cookie_secure(false)
                .cookie_http_only(true)
                .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(rate_limiter.clone()))
            .app_data(roster_registry.clone())
            .app_data(roster_hub.clone())
            // Static files
            .service(actix_files::Files::new("/static", "./static"))
            // Public routes
            .route("/login", web::get().to(handlers::auth_handlers::login_page))
            .route("/login", web::post().to(handlers::auth_handlers::login_submit))
            .route("/e/{id}", web::get().to(handlers::signup_handlers::show))
            .route("/e/{id}/signup", web::post().to(handlers::signup_handlers::submit))
            // Root redirect
            .route("/", web::get().to(|| async {
                actix_web::HttpResponse::SeeOther()
                    .insert_header(("Location", "/dashboard"))
                    .finish()
            }))
            // Protected routes
            .service(
                web::scope("")
                    .wrap(actix_web::middleware::from_fn(auth::middleware::require_auth))
                    .route("/dashboard", web::get().to(handlers::dashboard::index))
                    .route("/logout", web::post().to(handlers::auth_handlers::logout))
                    // Events — /events/new BEFORE /events/{id} to avoid routing conflict
                    .route("/events", web::get().to(handlers::event_handlers::list))
                    .route("/events/new", web::get().to(handlers::event_handlers::new_form))
                    .route("/events", web::post().to(handlers::event_handlers::create))
                    .route("/events/{id}/roles", web::post().to(handlers::event_handlers::add_role))
                    .route("/events/{id}/close", web::get().to(handlers::event_handlers::close_confirm))
                    .route("/events/{id}/close", web::post().to(handlers::event_handlers::close))
                    // Check-in console
                    .route("/events/{id}/roster", web::get().to(handlers::roster_handlers::console))
                    .route("/events/{id}/roster.json", web::get().to(handlers::roster_handlers::roster_json))
                    .route("/events/{id}/roster/ws", web::get().to(handlers::roster_handlers::ws_connect))
                    .route(
                        "/events/{id}/roster/{sid}/check-in",
                        web::post().to(handlers::roster_handlers::check_in),
                    )
                    .route(
                        "/events/{id}/roster/{sid}/check-out",
                        web::post().to(handlers::roster_handlers::check_out),
                    )
                    .route(
                        "/events/{id}/roster/{sid}/annotate",
                        web::post().to(handlers::roster_handlers::annotate),
                    )
                    // Contacts
                    .route("/contacts", web::get().to(handlers::contact_handlers::list)),
            )
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = include_str!("../templates/errors/404.html");
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind("127.0.0.1:8080")?
    .run()
    .await
}
