use anyhow::{anyhow, bail, Context};
use serde_json::Value;
use std::path::Path;

use umc_client::{FilePart, SessionFlows};
use umc_core::access::{Access, RouteGuard};
use umc_core::forms::{
    EditProfileForm, ForgotPasswordForm, LoginForm, ResetPasswordForm, SignupForm, UserAdminForm,
};
use umc_core::{ListUsersQuery, ManagedUser};

use crate::{Commands, UsersCommand};

const ADMIN_ROLE: &str = "admin";

pub async fn run(command: Commands, flows: &SessionFlows) -> anyhow::Result<()> {
    match command {
        Commands::Login { email, password } => {
            let user = flows.login(&LoginForm { email, password }).await?;
            println!("Logged in as {} <{}> ({})", user.display_name(), user.email, user.role);
        }
        Commands::GoogleLogin { id_token } => {
            let user = flows.google_login(&id_token).await?;
            println!("Logged in as {} <{}> ({})", user.display_name(), user.email, user.role);
        }
        Commands::OauthComplete { access_token, refresh_token } => {
            let user = flows
                .complete_oauth(access_token.as_deref(), refresh_token.as_deref())
                .await?;
            println!("Logged in as {} <{}> ({})", user.display_name(), user.email, user.role);
        }
        Commands::Signup { first_name, last_name, email, password } => {
            let form = SignupForm { first_name, last_name, email, password };
            print_message(&flows.register(&form).await?, "Account created, check your email");
        }
        Commands::ForgotPassword { email } => {
            let response = flows.forgot_password(&ForgotPasswordForm { email }).await?;
            print_message(&response, "Reset link sent");
        }
        Commands::ResetPassword { token, password, confirm_password } => {
            let form = ResetPasswordForm { password, confirm_password };
            print_message(&flows.reset_password(&token, &form).await?, "Password reset");
        }
        Commands::VerifyEmail { token } => {
            print_message(&flows.verify_email(&token).await?, "Email verified");
        }
        Commands::Whoami => {
            require(flows, &RouteGuard::Authenticated)?;
            let session = flows.store().session();
            if let Some(user) = session.user {
                println!("{} <{}>", user.display_name(), user.email);
                println!("  id:    {}", user.user_id);
                println!("  role:  {}", user.role);
                if let Some(image) = user.profile_image {
                    println!("  image: {}", image);
                }
            }
        }
        Commands::Profile { first_name, last_name, email, image } => {
            require(flows, &RouteGuard::Authenticated)?;
            let image = match image {
                Some(path) => Some(read_image(&path).await?),
                None => None,
            };
            let form = EditProfileForm { first_name, last_name, email };
            let user = flows.update_profile(&form, image).await?;
            println!("Profile updated: {} <{}>", user.display_name(), user.email);
        }
        Commands::Password { password, confirm_password } => {
            require(flows, &RouteGuard::Authenticated)?;
            let form = ResetPasswordForm { password, confirm_password };
            flows.update_password(&form).await?;
            println!("Password updated, please log in again");
        }
        Commands::Users(command) => {
            require(flows, &RouteGuard::roles([ADMIN_ROLE]))?;
            run_users(command, flows).await?;
        }
        Commands::Logout => {
            flows.logout();
            println!("Logged out");
        }
    }
    Ok(())
}

async fn run_users(command: UsersCommand, flows: &SessionFlows) -> anyhow::Result<()> {
    match command {
        UsersCommand::List { page, limit, search, sort_by, sort_order } => {
            let query = ListUsersQuery { page, limit, search, sort_by, sort_order };
            let users = flows.load_users(&query).await?;
            if users.is_empty() {
                println!("No users found");
            }
            for user in &users {
                print_row(user);
            }
        }
        UsersCommand::Show { id } => {
            let user = flows.user_details(&id).await?;
            print_row(&user);
            println!("  created: {}", user.created_at.format("%Y-%m-%d %H:%M"));
            println!("  updated: {}", user.updated_at.format("%Y-%m-%d %H:%M"));
        }
        UsersCommand::Edit { id, first_name, last_name, email, role, language, designation } => {
            let form = UserAdminForm { first_name, last_name, email, role, language, designation };
            print_message(&flows.edit_user(&id, form).await?, "User updated");
        }
        UsersCommand::Delete { id } => {
            print_message(&flows.delete_user(&id).await?, "User deleted");
        }
    }
    Ok(())
}

fn require(flows: &SessionFlows, guard: &RouteGuard) -> anyhow::Result<()> {
    match flows.guard(guard) {
        Access::Allow => Ok(()),
        Access::Redirect(route) if route == umc_core::access::LOGIN_ROUTE => {
            bail!("Not logged in, run `umc-console login` first")
        }
        Access::Redirect(_) => bail!("Forbidden: this command needs the {} role", ADMIN_ROLE),
    }
}

fn print_message(response: &Value, fallback: &str) {
    let message = response
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(fallback);
    println!("{}", message);
}

fn print_row(user: &ManagedUser) {
    println!(
        "{:<24} {:<28} {:<32} {:<8} {}",
        user.id,
        user.full_name(),
        user.email,
        user.role,
        user.status()
    );
}

async fn read_image(path: &Path) -> anyhow::Result<FilePart> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("invalid image path: {}", path.display()))?
        .to_string();
    let mime = match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("png") => Some("image/png"),
        Some("jpg") | Some("jpeg") => Some("image/jpeg"),
        Some("gif") => Some("image/gif"),
        Some("webp") => Some("image/webp"),
        _ => None,
    };
    Ok(FilePart {
        field: "profileImage".to_string(),
        file_name,
        mime: mime.map(str::to_string),
        bytes,
    })
}
