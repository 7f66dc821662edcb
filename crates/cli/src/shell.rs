//! The interactive storefront shell.
//!
//! Each line of input is a user-activity event for the idle timer. The
//! session can end underneath the shell (idle timeout, hard timeout); the
//! shell notices via the session subscription and returns to the login
//! prompt or exits.

// An interactive shell talks on stdout.
#![allow(clippy::print_stdout)]

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use candleworks_core::LogoutReason;
use candleworks_storefront::api::ApiError;
use candleworks_storefront::api::auth::RegisterRequest;
use candleworks_storefront::checkout::{PaymentError, PaymentGateway};
use candleworks_storefront::{Storefront, StorefrontError};

/// Shell-level errors.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Storefront(#[from] StorefrontError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A payment reference supplied by the user after paying through the hosted
/// gateway out-of-band.
struct ManualGateway {
    reference: String,
}

impl PaymentGateway for ManualGateway {
    fn collect_payment(
        &self,
        _amount: Decimal,
    ) -> impl Future<Output = Result<String, PaymentError>> + Send {
        let reference = self.reference.clone();
        async move {
            if reference.is_empty() {
                Err(PaymentError("empty payment reference".to_string()))
            } else {
                Ok(reference)
            }
        }
    }
}

type InputLines = Lines<BufReader<Stdin>>;

fn input() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

async fn prompt(lines: &mut InputLines, label: &str) -> Result<String, ShellError> {
    println!("{label}");
    Ok(lines.next_line().await?.unwrap_or_default())
}

/// Run the interactive shell: probe, log in if needed, then dispatch
/// commands until quit or session end.
pub async fn run(store: Storefront) -> Result<(), ShellError> {
    let mut lines = input();

    // No protected view renders before the probe resolves.
    let state = store.session().start().await;
    println!("Session: {state:?}");

    loop {
        if !store.session().state().is_authenticated() {
            let username = prompt(&mut lines, "Username:").await?;
            if username.is_empty() {
                return Ok(());
            }
            let password = prompt(&mut lines, "Password:").await?;
            match store.session().login(&username, &password).await {
                Ok(()) => println!("Logged in. Type 'help' for commands."),
                Err(e) => {
                    println!("Login failed: {e}");
                    continue;
                }
            }
            store.cart().load().await;
        }

        match shop_loop(&store, &mut lines).await? {
            ShellExit::Quit => return Ok(()),
            ShellExit::LoggedOut => {}
        }
    }
}

enum ShellExit {
    Quit,
    LoggedOut,
}

async fn shop_loop(store: &Storefront, lines: &mut InputLines) -> Result<ShellExit, ShellError> {
    let mut session_rx = store.session().subscribe();

    loop {
        println!("cw> ");
        let line = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => return Ok(ShellExit::Quit),
            },
            changed = session_rx.changed() => {
                if changed.is_err() {
                    return Ok(ShellExit::Quit);
                }
                let snapshot = session_rx.borrow_and_update().clone();
                if let Some(reason) = snapshot.ended {
                    if reason == LogoutReason::Idle {
                        // Idle logout waits for acknowledgment before the
                        // shell redirects to login.
                        println!("You were logged out due to inactivity. Press Enter to continue.");
                        let _ = lines.next_line().await?;
                    } else {
                        println!("Session ended ({reason}).");
                    }
                    return Ok(ShellExit::LoggedOut);
                }
                continue;
            }
        };

        // Every typed line is a qualifying activity event.
        store.session().record_activity();

        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let rest: Vec<&str> = parts.collect();

        match command {
            "help" => print_help(),
            "products" => match store.api().products().await {
                Ok(products) => {
                    for product in products.iter() {
                        println!("  {} - {}", product.name, product.price);
                    }
                }
                Err(e) => println!("Could not load products: {e}"),
            },
            "reviews" => match store.api().reviews().await {
                Ok(reviews) => {
                    for review in reviews.iter() {
                        println!("  {} [{}/5] {}", review.product, review.rating, review.comment);
                    }
                }
                Err(e) => println!("Could not load reviews: {e}"),
            },
            "cart" => {
                store.cart().load().await;
                let items = store.cart().items();
                if items.is_empty() {
                    println!("Your cart is empty.");
                }
                for item in &items {
                    println!("  {} x{} @ {}", item.name, item.quantity, item.price);
                }
            }
            "add" => {
                let name = rest.join(" ");
                match store.api().products().await {
                    Ok(products) => match products.iter().find(|p| p.name == name) {
                        Some(product) => {
                            store.cart().add(product);
                            println!("Added {name}.");
                        }
                        None => println!("No such product: {name}"),
                    },
                    Err(e) => println!("Could not load products: {e}"),
                }
            }
            "qty" => {
                if let [name @ .., raw] = rest.as_slice()
                    && !name.is_empty()
                {
                    let name = name.join(" ");
                    let committed = store.cart().commit_quantity(&name, raw);
                    println!("{name} quantity set to {committed}.");
                } else {
                    println!("Usage: qty <product name> <quantity>");
                }
            }
            "remove" => {
                let name = rest.join(" ");
                store.cart().remove(&name);
                println!("Removed {name}.");
            }
            "address" => match store.api().fetch_addresses().await {
                Ok(addresses) => match addresses.first() {
                    Some(address) => println!("Delivering to: {}", address.summary()),
                    None => println!("No address on file."),
                },
                Err(e) => {
                    // Read failure degrades, never blocks the view.
                    tracing::warn!(error = %e, "Failed to fetch addresses");
                    println!("No address on file.");
                }
            },
            "checkout" => {
                let Some(reference) = rest.first() else {
                    println!("Usage: checkout <payment-reference> (or 'checkout-qr')");
                    continue;
                };
                let address = store
                    .api()
                    .fetch_addresses()
                    .await
                    .ok()
                    .and_then(|addresses| addresses.into_iter().next());
                let gateway = ManualGateway {
                    reference: (*reference).to_string(),
                };
                match store.checkout().checkout_with_gateway(&gateway, address).await {
                    Ok(order) => println!(
                        "Order placed: {} items, total {}.",
                        order.items.len(),
                        order.total_amount
                    ),
                    Err(e) => println!("Checkout failed: {e}"),
                }
            }
            "checkout-qr" => {
                checkout_qr(store, lines).await?;
            }
            "logout" => {
                store.session().logout().await;
                println!("Logged out.");
                return Ok(ShellExit::LoggedOut);
            }
            "quit" | "exit" => return Ok(ShellExit::Quit),
            other => println!("Unknown command: {other} (try 'help')"),
        }
    }
}

async fn checkout_qr(store: &Storefront, lines: &mut InputLines) -> Result<(), ShellError> {
    let Some(payee) = store.config().upi_payee.clone() else {
        println!("QR checkout is not configured (set CANDLEWORKS_UPI_PAYEE_VPA).");
        return Ok(());
    };

    let checkout = match store.checkout().begin_qr_checkout(&payee).await {
        Ok(checkout) => checkout,
        Err(e) => {
            println!("Could not start QR checkout: {e}");
            return Ok(());
        }
    };

    println!("Scan to pay {}:", checkout.amount);
    println!("  {}", checkout.upi_uri);
    println!("Waiting for payment confirmation (Enter cancels)...");

    let poll = checkout.poll;
    tokio::select! {
        outcome = poll.outcome() => match outcome {
            Some(candleworks_core::PaymentOutcome::Confirmed) => {
                println!("Payment confirmed. Your order has been placed.");
            }
            Some(candleworks_core::PaymentOutcome::TimedOut) => {
                println!("Payment confirmation timed out. Please try again.");
            }
            None => println!("Payment confirmation cancelled."),
        },
        _ = lines.next_line() => {
            println!("Cancelled.");
        }
    }
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  products              list the catalog");
    println!("  reviews               list product reviews");
    println!("  cart                  show the cart");
    println!("  add <name>            add a product to the cart");
    println!("  qty <name> <n>        set an item's quantity");
    println!("  remove <name>         remove an item");
    println!("  address               show the delivery address");
    println!("  checkout <reference>  place the order (gateway reference)");
    println!("  checkout-qr           pay by UPI QR and wait for confirmation");
    println!("  logout                log out");
    println!("  quit                  leave the shell");
}

/// Register a new account, completing OTP verification inline.
pub async fn register(store: &Storefront, username: &str, email: &str) -> Result<(), ShellError> {
    let mut lines = input();

    let password = prompt(&mut lines, "Password:").await?;
    let first_name = prompt(&mut lines, "First name:").await?;
    let last_name = prompt(&mut lines, "Last name:").await?;
    let mobile_number = prompt(&mut lines, "Mobile number:").await?;

    store
        .api()
        .register(&RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password,
            first_name,
            last_name,
            mobile_number,
        })
        .await?;

    let otp = prompt(&mut lines, "Enter the OTP sent to your email:").await?;
    store.api().verify_otp(email, &otp).await?;
    println!("Registration complete. You can now log in with 'cw-cli shop'.");
    Ok(())
}

/// Run the three-step password recovery flow.
pub async fn forgot_password(store: &Storefront, identifier: &str) -> Result<(), ShellError> {
    let mut lines = input();

    store.api().forgot_password(identifier).await?;
    println!("If an account exists, instructions have been sent.");

    let otp = prompt(&mut lines, "Enter the OTP:").await?;
    store.api().verify_otp_password_reset(identifier, &otp).await?;

    let new_password = prompt(&mut lines, "New password:").await?;
    store.api().reset_password(identifier, &new_password).await?;
    println!("Password reset. You can now log in with 'cw-cli shop'.");
    Ok(())
}
