//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use sealmail_core::artifact::{OrgKey, OrgSignet, UserKey, UserSignet, UserSigningRequest};
use sealmail_core::chunk::Role;
use sealmail_core::codec::armor;
use sealmail_core::facade::{self, Artifact, Encoding};
use sealmail_core::primitives::Secp256k1Key;
use sealmail_types::artifact::ArtifactKind;

#[derive(Parser, Debug)]
#[command(author, version, about = "sealmail identity and message tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a fresh org or user key
    Keygen(KeygenCmd),
    /// Derive an org signet from an org key
    Signet(SignetCmd),
    /// Build a user signing request (first-generation or renewal)
    Request(RequestCmd),
    /// Countersign a signing request into a user signet
    SignRequest(SignRequestCmd),
    /// Encrypt a plaintext message
    Encrypt(EncryptCmd),
    /// Decrypt a message
    Decrypt(DecryptCmd),
    /// Wrap a binary artifact file in armored text
    Armor(ArmorCmd),
    /// Unwrap an armored artifact file to binary
    Unarmor(UnarmorCmd),
    /// Print an org or user signet's fingerprint
    Fingerprint(FingerprintCmd),
    /// Validate an org or user signet
    Validate(ValidateCmd),
}

#[derive(Args, Debug)]
struct KeygenCmd {
    #[arg(long, value_parser = ["org", "user"])]
    kind: String,
    #[arg(long, value_name = "PATH")]
    out: PathBuf,
    /// Wrap the key at rest under a STACIE-derived password envelope
    #[arg(long)]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct SignetCmd {
    #[arg(long, value_name = "PATH")]
    key: PathBuf,
    #[arg(long)]
    password: Option<String>,
    #[arg(long, value_name = "PATH")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RequestCmd {
    #[arg(long, value_name = "PATH")]
    user_key: PathBuf,
    #[arg(long)]
    password: Option<String>,
    /// Predecessor's user key, for a renewal request
    #[arg(long, value_name = "PATH")]
    previous_key: Option<PathBuf>,
    #[arg(long)]
    previous_password: Option<String>,
    /// Predecessor signet's fingerprint, 64 hex chars
    #[arg(long, value_name = "HEX")]
    previous_identifier: Option<String>,
    #[arg(long, value_name = "PATH")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct SignRequestCmd {
    #[arg(long, value_name = "PATH")]
    request: PathBuf,
    /// The requesting user's own signing key (self-custody on first
    /// generation, the predecessor's key on renewal)
    #[arg(long, value_name = "PATH")]
    request_signing_key: PathBuf,
    #[arg(long)]
    request_signing_password: Option<String>,
    #[arg(long, value_name = "PATH")]
    org_key: PathBuf,
    #[arg(long)]
    org_password: Option<String>,
    #[arg(long, value_name = "PATH")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct EncryptCmd {
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    #[arg(long, value_name = "PATH")]
    author_key: PathBuf,
    #[arg(long)]
    author_password: Option<String>,
    #[arg(long, value_name = "PATH")]
    origin_key: Option<PathBuf>,
    #[arg(long)]
    origin_password: Option<String>,
    #[arg(long, value_name = "PATH")]
    destination_signet: Option<PathBuf>,
    /// Recipient's public encryption key, 33-byte SEC1-compressed point in hex
    #[arg(long, value_name = "HEX")]
    recipient_pub: String,
    #[arg(long, value_name = "PATH")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct DecryptCmd {
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    #[arg(long, value_parser = ["author", "origin", "destination", "recipient"])]
    role: String,
    /// The role's private encryption key, 32-byte scalar in hex
    #[arg(long, value_name = "HEX")]
    role_key: String,
    #[arg(long, value_name = "PATH")]
    author_signet: PathBuf,
    #[arg(long, value_name = "PATH")]
    org_signet: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ArmorCmd {
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    #[arg(long, value_name = "PATH")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct UnarmorCmd {
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    #[arg(long, value_name = "PATH")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct FingerprintCmd {
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    #[arg(long, value_parser = ["org-signet", "user-signet"])]
    kind: String,
}

#[derive(Args, Debug)]
struct ValidateCmd {
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    #[arg(long, value_parser = ["org-signet", "user-signet"])]
    kind: String,
    /// Validating org signet, required for a user signet
    #[arg(long, value_name = "PATH")]
    validator: Option<PathBuf>,
    /// Predecessor's signing key, for a renewal user signet
    #[arg(long, value_name = "PATH")]
    predecessor_key: Option<PathBuf>,
    #[arg(long)]
    predecessor_password: Option<String>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Keygen(args) => handle_keygen(args),
        Commands::Signet(args) => handle_signet(args),
        Commands::Request(args) => handle_request(args),
        Commands::SignRequest(args) => handle_sign_request(args),
        Commands::Encrypt(args) => handle_encrypt(args),
        Commands::Decrypt(args) => handle_decrypt(args),
        Commands::Armor(args) => handle_armor(args),
        Commands::Unarmor(args) => handle_unarmor(args),
        Commands::Fingerprint(args) => handle_fingerprint(args),
        Commands::Validate(args) => handle_validate(args),
    }
}

/// Read a file and, if it is a password-protected key envelope, unwrap it;
/// otherwise parse it (armored or binary) as the artifact `kind` names.
fn load_key(path: &Path, kind: ArtifactKind, password: Option<&str>) -> Result<Artifact> {
    let bytes = fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))?;
    let text = std::str::from_utf8(&bytes).ok();
    let label = text.and_then(|t| armor::peek_label(t).ok());

    let encrypted_kind = match kind {
        ArtifactKind::OrgKey => ArtifactKind::OrgKeyEncrypted,
        ArtifactKind::UserKey => ArtifactKind::UserKeyEncrypted,
        other => other,
    };

    if label.as_deref() == Some(encrypted_kind.armor_label()) {
        let password = password.ok_or_else(|| {
            anyhow!("'{}' is password-protected; pass --password", path.display())
        })?;
        let wrapped = armor::decode(encrypted_kind.armor_label(), text.unwrap())?;
        return Ok(facade::key_decrypt(password.as_bytes(), &wrapped, kind)?);
    }

    let encoding = if text.is_some() && label.is_some() {
        Encoding::Armored
    } else {
        Encoding::Binary
    };
    Ok(facade::set(&bytes, encoding, kind)?)
}

fn save_artifact(artifact: &Artifact, path: &Path) -> Result<()> {
    let armored = facade::get(artifact, Encoding::Armored)?;
    fs::write(path, armored).with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}

fn load_user_key(path: &Path, password: Option<&str>) -> Result<UserKey> {
    match load_key(path, ArtifactKind::UserKey, password)? {
        Artifact::UserKey(key) => Ok(key),
        _ => Err(anyhow!("'{}' is not a user key", path.display())),
    }
}

fn load_org_key(path: &Path, password: Option<&str>) -> Result<OrgKey> {
    match load_key(path, ArtifactKind::OrgKey, password)? {
        Artifact::OrgKey(key) => Ok(key),
        _ => Err(anyhow!("'{}' is not an org key", path.display())),
    }
}

fn load_org_signet(path: &Path) -> Result<OrgSignet> {
    match load_key(path, ArtifactKind::OrgSignet, None)? {
        Artifact::OrgSignet(signet) => Ok(signet),
        _ => Err(anyhow!("'{}' is not an org signet", path.display())),
    }
}

fn load_user_signet(path: &Path) -> Result<UserSignet> {
    match load_key(path, ArtifactKind::UserSignet, None)? {
        Artifact::UserSignet(signet) => Ok(signet),
        _ => Err(anyhow!("'{}' is not a user signet", path.display())),
    }
}

fn parse_hex_array<const N: usize>(s: &str, what: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(s).with_context(|| format!("{what}: not valid hex"))?;
    anyhow::ensure!(bytes.len() == N, "{what} must be {N} bytes ({} hex chars)", N * 2);
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn handle_keygen(args: KeygenCmd) -> Result<()> {
    let kind = match args.kind.as_str() {
        "org" => ArtifactKind::OrgKey,
        "user" => ArtifactKind::UserKey,
        other => return Err(anyhow!("unknown key kind '{other}'")),
    };
    let artifact = facade::key_generate(kind)?;

    if let Some(password) = &args.password {
        let wrapped = facade::key_encrypt(password.as_bytes(), &artifact)?;
        let encrypted_kind = match kind {
            ArtifactKind::OrgKey => ArtifactKind::OrgKeyEncrypted,
            ArtifactKind::UserKey => ArtifactKind::UserKeyEncrypted,
            other => other,
        };
        let armored = armor::encode(encrypted_kind.armor_label(), &wrapped);
        fs::write(&args.out, armored)
            .with_context(|| format!("failed to write '{}'", args.out.display()))?;
    } else {
        save_artifact(&artifact, &args.out)?;
    }

    println!("wrote {} key to {}", args.kind, args.out.display());
    Ok(())
}

fn handle_signet(args: SignetCmd) -> Result<()> {
    let org_key = load_org_key(&args.key, args.password.as_deref())?;
    let signet = facade::signet_generate_org(&org_key)?;
    save_artifact(&Artifact::OrgSignet(signet), &args.out)?;
    println!("wrote org signet to {}", args.out.display());
    Ok(())
}

fn handle_request(args: RequestCmd) -> Result<()> {
    let user = load_user_key(&args.user_key, args.password.as_deref())?;

    let previous = match (&args.previous_key, &args.previous_identifier) {
        (Some(key_path), Some(identifier_hex)) => {
            let predecessor = load_user_key(key_path, args.previous_password.as_deref())?;
            let identifier: [u8; 32] = parse_hex_array(identifier_hex, "previous_identifier")?;
            Some((predecessor, identifier))
        }
        (None, None) => None,
        _ => {
            return Err(anyhow!(
                "--previous-key and --previous-identifier must be given together"
            ))
        }
    };

    let request = facade::request_generate(
        &user,
        previous.as_ref().map(|(key, id)| (&key.signing, *id)),
    )?;
    save_artifact(&Artifact::UserSigningRequest(request), &args.out)?;
    println!("wrote signing request to {}", args.out.display());
    Ok(())
}

fn handle_sign_request(args: SignRequestCmd) -> Result<()> {
    let request = match load_key(&args.request, ArtifactKind::UserSigningRequest, None)? {
        Artifact::UserSigningRequest(request) => request,
        _ => return Err(anyhow!("'{}' is not a signing request", args.request.display())),
    };
    let request_signing_user = load_user_key(
        &args.request_signing_key,
        args.request_signing_password.as_deref(),
    )?;
    let org_key = load_org_key(&args.org_key, args.org_password.as_deref())?;
    let ctx = facade::start(org_key)?;

    let signet = facade::request_sign(&request, &request_signing_user.signing, &ctx)?;
    save_artifact(&Artifact::UserSignet(signet), &args.out)?;
    println!("wrote user signet to {}", args.out.display());
    Ok(())
}

fn handle_encrypt(args: EncryptCmd) -> Result<()> {
    let plaintext =
        fs::read(&args.input).with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let author = load_user_key(&args.author_key, args.author_password.as_deref())?;
    let origin = args
        .origin_key
        .as_deref()
        .map(|path| load_org_key(path, args.origin_password.as_deref()))
        .transpose()?;
    let destination = args
        .destination_signet
        .as_deref()
        .map(load_org_signet)
        .transpose()?;

    let recipient_bytes: [u8; 33] = parse_hex_array(&args.recipient_pub, "recipient_pub")?;
    let recipient = Secp256k1Key::from_public_bytes(&recipient_bytes)?;

    let message = facade::message_encrypt(
        &plaintext,
        &author,
        origin.as_ref(),
        destination.as_ref(),
        &recipient,
    )?;
    fs::write(&args.out, &message).with_context(|| format!("failed to write '{}'", args.out.display()))?;
    println!("wrote {} bytes to {}", message.len(), args.out.display());
    Ok(())
}

fn handle_decrypt(args: DecryptCmd) -> Result<()> {
    let message =
        fs::read(&args.input).with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let role = match args.role.as_str() {
        "author" => Role::Author,
        "origin" => Role::Origin,
        "destination" => Role::Destination,
        "recipient" => Role::Recipient,
        other => return Err(anyhow!("unknown role '{other}'")),
    };
    let role_key_bytes: [u8; 32] = parse_hex_array(&args.role_key, "role_key")?;
    let role_key = Secp256k1Key::from_private_bytes(&role_key_bytes)?;
    let author_signet = load_user_signet(&args.author_signet)?;
    let org_signet = args.org_signet.as_deref().map(load_org_signet).transpose()?;

    let decoded = facade::message_decrypt(&message, role, &role_key, &author_signet, org_signet.as_ref())?;
    fs::write(&args.out, &decoded.plaintext)
        .with_context(|| format!("failed to write '{}'", args.out.display()))?;
    println!("wrote {} plaintext bytes to {}", decoded.plaintext.len(), args.out.display());
    Ok(())
}

fn handle_armor(args: ArmorCmd) -> Result<()> {
    let bytes =
        fs::read(&args.input).with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let (magic, _) = sealmail_core::codec::unframe_artifact(&bytes)
        .map_err(|_| anyhow!("'{}' is not a recognized binary artifact", args.input.display()))?;
    let kind = ArtifactKind::from_magic(magic)
        .ok_or_else(|| anyhow!("'{}' has an unknown artifact magic {magic}", args.input.display()))?;
    let armored = armor::encode(kind.armor_label(), &bytes);
    fs::write(&args.out, armored).with_context(|| format!("failed to write '{}'", args.out.display()))?;
    Ok(())
}

fn handle_unarmor(args: UnarmorCmd) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let label = armor::peek_label(&text)?;
    let kind = ArtifactKind::from_armor_label(&label)
        .ok_or_else(|| anyhow!("unrecognized armor label '{label}'"))?;
    let binary = armor::decode(kind.armor_label(), &text)?;
    fs::write(&args.out, binary).with_context(|| format!("failed to write '{}'", args.out.display()))?;
    Ok(())
}

fn handle_fingerprint(args: FingerprintCmd) -> Result<()> {
    let fingerprint = match args.kind.as_str() {
        "org-signet" => facade::signet_fingerprint_org(&load_org_signet(&args.input)?)?,
        "user-signet" => facade::signet_fingerprint_user(&load_user_signet(&args.input)?)?,
        other => return Err(anyhow!("unknown signet kind '{other}'")),
    };
    println!("{}", hex::encode(fingerprint));
    Ok(())
}

fn handle_validate(args: ValidateCmd) -> Result<()> {
    let valid = match args.kind.as_str() {
        "org-signet" => facade::signet_validate_org(&load_org_signet(&args.input)?)?,
        "user-signet" => {
            let signet = load_user_signet(&args.input)?;
            let validator = args
                .validator
                .as_deref()
                .ok_or_else(|| anyhow!("--validator is required for a user signet"))?;
            let org_signet = load_org_signet(validator)?;
            match &args.predecessor_key {
                Some(path) => {
                    let predecessor =
                        load_user_key(path, args.predecessor_password.as_deref())?;
                    facade::signet_validate_user_renewal(&signet, &org_signet, &predecessor.signing)?
                }
                None => facade::signet_validate_user(&signet, &org_signet)?,
            }
        }
        other => return Err(anyhow!("unknown signet kind '{other}'")),
    };
    println!("{valid}");
    if !valid {
        process::exit(1);
    }
    Ok(())
}
