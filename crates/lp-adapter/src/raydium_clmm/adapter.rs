//! Plan assembly for the tick family: resolves ranges, derives every
//! touched address, and emits ordered instruction lists.

use rust_decimal::Decimal;
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};
use tracing::debug;

use super::state::{PersonalPosition, PoolState};
use super::{
    close_position, decrease_liquidity, derive_personal_position, derive_protocol_position,
    derive_tick_array, increase_liquidity, math, open_position, CLMM_PROGRAM_ID,
};
use crate::adapter::{fetch_pool, mint_info, DecodedPool};
use crate::cache::StateCache;
use crate::config::AdapterConfig;
use crate::error::{Error, RangeError, Result};
use crate::range::PriceRange;
use crate::rpc::{AccountReader, TokenAccountView};
use crate::types::{InstructionPlan, PoolSnapshot, PositionSnapshot, ProtocolKind, RewardSlot, Token};
use crate::utils::{
    associated_token_address, create_ata_idempotent_instruction, token_program_for_mint,
    ui_amount_to_amount, unwrap_wsol_instruction, with_slippage_up, wrap_sol_instructions,
    TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID, WSOL_MINT,
};

async fn clmm_pool<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    address: &Pubkey,
    refresh: bool,
) -> Result<PoolState> {
    match fetch_pool(reader, cache, address, refresh).await? {
        DecodedPool::Clmm(pool) => Ok(pool),
        DecodedPool::Dlmm(_) => Err(Error::UnexpectedAccountOwner {
            address: *address,
            owner: crate::meteora_dlmm::DLMM_PROGRAM_ID,
            expected: CLMM_PROGRAM_ID,
        }),
    }
}

/// Fetch a personal position by its NFT mint.
pub async fn fetch_position<R: AccountReader>(
    reader: &R,
    nft_mint: &Pubkey,
) -> Result<PersonalPosition> {
    let personal = derive_personal_position(nft_mint)?;
    let account = reader
        .read_account(&personal.address)
        .await?
        .ok_or(Error::PositionNotFound(*nft_mint))?;
    PersonalPosition::decode(&account.data)
}

/// Resolve a caller range to tick bounds aligned to the pool's spacing.
pub fn resolve_range(pool: &PoolState, range: &PriceRange) -> Result<(i32, i32)> {
    let spacing = pool.tick_spacing;
    let (lower, upper) = match range {
        PriceRange::SingleUnit => math::one_tick_range(pool.tick_current, spacing),
        PriceRange::Units { lower, upper } => (*lower, *upper),
        _ => {
            let price = math::sqrt_price_x64_to_price(
                pool.sqrt_price_x64,
                pool.mint_decimals_a,
                pool.mint_decimals_b,
            )?;
            let (lower_price, upper_price) = range.to_absolute(price)?;
            (
                math::price_to_tick(
                    lower_price,
                    pool.mint_decimals_a,
                    pool.mint_decimals_b,
                    spacing,
                )?,
                math::price_to_tick(
                    upper_price,
                    pool.mint_decimals_a,
                    pool.mint_decimals_b,
                    spacing,
                )?,
            )
        }
    };

    let mut upper = upper;
    // a range that collapsed onto one tick after spacing alignment still
    // needs nonzero width
    if lower == upper {
        upper = lower + spacing as i32;
    }
    if lower > upper {
        return Err(RangeError::LowerGreaterThanUpper {
            lower: lower.to_string(),
            upper: upper.to_string(),
        }
        .into());
    }
    for tick in [lower, upper] {
        if !(super::MIN_TICK..=super::MAX_TICK).contains(&tick) {
            return Err(RangeError::OutOfBounds {
                unit: "tick",
                value: tick as i64,
                min: super::MIN_TICK as i64,
                max: super::MAX_TICK as i64,
            }
            .into());
        }
    }
    Ok((lower, upper))
}

/// Open a position: wrap WSOL if a side needs it, ensure owner ATAs, then
/// `open_position_with_token22_nft` signed additionally by a fresh NFT mint.
#[allow(clippy::too_many_arguments)]
pub async fn open_plan<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    config: &AdapterConfig,
    pool_address: &Pubkey,
    range: &PriceRange,
    amount_a: Decimal,
    amount_b: Decimal,
    owner: &Pubkey,
    slippage_bps: Option<u16>,
) -> Result<InstructionPlan> {
    let pool = clmm_pool(reader, cache, pool_address, false).await?;
    let (tick_lower, tick_upper) = resolve_range(&pool, range)?;
    let slippage = slippage_bps.unwrap_or(config.default_slippage_bps);

    let amount_a_raw = ui_amount_to_amount(amount_a, pool.mint_decimals_a)?;
    let amount_b_raw = ui_amount_to_amount(amount_b, pool.mint_decimals_b)?;

    let sqrt_lower = math::tick_to_sqrt_price_x64(tick_lower)?;
    let sqrt_upper = math::tick_to_sqrt_price_x64(tick_upper)?;
    let liquidity = math::liquidity_from_amounts(
        amount_a_raw,
        amount_b_raw,
        pool.sqrt_price_x64,
        sqrt_lower,
        sqrt_upper,
    );
    let amount_0_max = with_slippage_up(amount_a_raw, slippage);
    let amount_1_max = with_slippage_up(amount_b_raw, slippage);

    debug!(
        %pool_address,
        tick_lower,
        tick_upper,
        liquidity,
        "building open position plan"
    );

    let mut instructions = Vec::new();
    if pool.mint_a == WSOL_MINT && amount_0_max > 0 {
        instructions.extend(wrap_sol_instructions(
            owner,
            amount_0_max + config.wsol_wrap_buffer_lamports,
        ));
    }
    if pool.mint_b == WSOL_MINT && amount_1_max > 0 {
        instructions.extend(wrap_sol_instructions(
            owner,
            amount_1_max + config.wsol_wrap_buffer_lamports,
        ));
    }

    let (_, program_a) = mint_info(reader, cache, &pool.mint_a).await?;
    let (_, program_b) = mint_info(reader, cache, &pool.mint_b).await?;
    instructions.push(create_ata_idempotent_instruction(
        owner, owner, &pool.mint_a, &program_a,
    ));
    instructions.push(create_ata_idempotent_instruction(
        owner, owner, &pool.mint_b, &program_b,
    ));

    let nft_mint = Keypair::new();
    let nft_mint_pubkey = nft_mint.pubkey();
    let personal_position = derive_personal_position(&nft_mint_pubkey)?;
    let nft_account =
        associated_token_address(owner, &nft_mint_pubkey, &TOKEN_2022_PROGRAM_ID);

    let accounts = open_position::OpenPositionAccounts {
        payer: *owner,
        position_nft_owner: *owner,
        position_nft_mint: nft_mint_pubkey,
        position_nft_account: nft_account,
        pool_state: *pool_address,
        protocol_position: derive_protocol_position(pool_address, tick_lower, tick_upper)?
            .address,
        tick_array_lower: derive_tick_array(pool_address, tick_lower, pool.tick_spacing)?
            .address,
        // the upper bound itself belongs to the next array; key on the last
        // contained tick instead
        tick_array_upper: derive_tick_array(pool_address, tick_upper - 1, pool.tick_spacing)?
            .address,
        personal_position: personal_position.address,
        token_account_0: associated_token_address(owner, &pool.mint_a, &program_a),
        token_account_1: associated_token_address(owner, &pool.mint_b, &program_b),
        token_vault_0: pool.vault_a,
        token_vault_1: pool.vault_b,
        vault_0_mint: pool.mint_a,
        vault_1_mint: pool.mint_b,
    };
    let args = open_position::OpenPositionArgs {
        tick_lower_index: tick_lower,
        tick_upper_index: tick_upper,
        tick_array_lower_start_index: math::tick_array_start_index(tick_lower, pool.tick_spacing),
        tick_array_upper_start_index: math::tick_array_start_index(
            tick_upper - 1,
            pool.tick_spacing,
        ),
        liquidity,
        amount_0_max,
        amount_1_max,
        with_metadata: true,
        base_flag: None,
    };
    instructions.push(open_position::build(&accounts, &args)?);

    Ok(InstructionPlan::new(instructions)
        .with_signer(nft_mint)
        .with_position_id(nft_mint_pubkey))
}

/// Add liquidity to an existing position. Returns an empty plan when the
/// amounts support no liquidity at the current price.
pub async fn add_plan<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    config: &AdapterConfig,
    position: &PersonalPosition,
    amount_a: Decimal,
    amount_b: Decimal,
    owner: &Pubkey,
    slippage_bps: Option<u16>,
) -> Result<InstructionPlan> {
    let pool = clmm_pool(reader, cache, &position.pool_id, false).await?;
    let slippage = slippage_bps.unwrap_or(config.default_slippage_bps);

    let amount_a_raw = ui_amount_to_amount(amount_a, pool.mint_decimals_a)?;
    let amount_b_raw = ui_amount_to_amount(amount_b, pool.mint_decimals_b)?;

    let sqrt_lower = math::tick_to_sqrt_price_x64(position.tick_lower)?;
    let sqrt_upper = math::tick_to_sqrt_price_x64(position.tick_upper)?;
    let liquidity = math::liquidity_from_amounts(
        amount_a_raw,
        amount_b_raw,
        pool.sqrt_price_x64,
        sqrt_lower,
        sqrt_upper,
    );
    if liquidity == 0 {
        debug!(nft_mint = %position.nft_mint, "amounts support no liquidity, nothing to add");
        return Ok(InstructionPlan::new(vec![]));
    }

    let amount_0_max = with_slippage_up(amount_a_raw, slippage);
    let amount_1_max = with_slippage_up(amount_b_raw, slippage);

    let mut instructions = Vec::new();
    if pool.mint_a == WSOL_MINT && amount_0_max > 0 {
        instructions.extend(wrap_sol_instructions(
            owner,
            amount_0_max + config.wsol_wrap_buffer_lamports,
        ));
    }
    if pool.mint_b == WSOL_MINT && amount_1_max > 0 {
        instructions.extend(wrap_sol_instructions(
            owner,
            amount_1_max + config.wsol_wrap_buffer_lamports,
        ));
    }

    let (_, program_a) = mint_info(reader, cache, &pool.mint_a).await?;
    let (_, program_b) = mint_info(reader, cache, &pool.mint_b).await?;
    let (_, nft_program) = mint_info(reader, cache, &position.nft_mint).await?;

    let accounts = increase_liquidity::IncreaseLiquidityAccounts {
        nft_owner: *owner,
        nft_account: associated_token_address(owner, &position.nft_mint, &nft_program),
        pool_state: position.pool_id,
        protocol_position: derive_protocol_position(
            &position.pool_id,
            position.tick_lower,
            position.tick_upper,
        )?
        .address,
        personal_position: derive_personal_position(&position.nft_mint)?.address,
        tick_array_lower: derive_tick_array(
            &position.pool_id,
            position.tick_lower,
            pool.tick_spacing,
        )?
        .address,
        tick_array_upper: derive_tick_array(
            &position.pool_id,
            position.tick_upper - 1,
            pool.tick_spacing,
        )?
        .address,
        token_account_0: associated_token_address(owner, &pool.mint_a, &program_a),
        token_account_1: associated_token_address(owner, &pool.mint_b, &program_b),
        token_vault_0: pool.vault_a,
        token_vault_1: pool.vault_b,
        vault_0_mint: pool.mint_a,
        vault_1_mint: pool.mint_b,
    };
    let args = increase_liquidity::IncreaseLiquidityArgs {
        liquidity,
        amount_0_max,
        amount_1_max,
        base_flag: None,
    };
    instructions.push(increase_liquidity::build(&accounts, &args)?);
    Ok(InstructionPlan::new(instructions))
}

/// The decrease instruction together with the ATA creations it relies on.
/// A zero delta settles fees and rewards without touching liquidity.
async fn decrease_ixs<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    pool: &PoolState,
    position: &PersonalPosition,
    owner: &Pubkey,
    liquidity_delta: u128,
) -> Result<Vec<solana_sdk::instruction::Instruction>> {
    let (_, program_a) = mint_info(reader, cache, &pool.mint_a).await?;
    let (_, program_b) = mint_info(reader, cache, &pool.mint_b).await?;
    let (_, nft_program) = mint_info(reader, cache, &position.nft_mint).await?;

    let mut instructions = vec![
        create_ata_idempotent_instruction(owner, owner, &pool.mint_a, &program_a),
        create_ata_idempotent_instruction(owner, owner, &pool.mint_b, &program_b),
    ];

    let mut rewards = Vec::new();
    for reward in pool.live_rewards() {
        let reward_program = match cache.token_program(&reward.token_mint) {
            Some(program) => program,
            None => {
                let account = reader.read_account(&reward.token_mint).await?;
                let program = token_program_for_mint(
                    &reward.token_mint,
                    account.as_ref().map(|a| &a.owner),
                );
                cache.store_token_program(reward.token_mint, program);
                program
            }
        };
        let reward_ata = associated_token_address(owner, &reward.token_mint, &reward_program);
        instructions.push(create_ata_idempotent_instruction(
            owner,
            owner,
            &reward.token_mint,
            &reward_program,
        ));
        rewards.push(decrease_liquidity::RewardAccounts {
            reward_vault: reward.token_vault,
            recipient_token_account: reward_ata,
            reward_mint: reward.token_mint,
        });
    }

    let accounts = decrease_liquidity::DecreaseLiquidityAccounts {
        nft_owner: *owner,
        nft_account: associated_token_address(owner, &position.nft_mint, &nft_program),
        personal_position: derive_personal_position(&position.nft_mint)?.address,
        pool_state: position.pool_id,
        protocol_position: derive_protocol_position(
            &position.pool_id,
            position.tick_lower,
            position.tick_upper,
        )?
        .address,
        token_vault_0: pool.vault_a,
        token_vault_1: pool.vault_b,
        tick_array_lower: derive_tick_array(
            &position.pool_id,
            position.tick_lower,
            pool.tick_spacing,
        )?
        .address,
        tick_array_upper: derive_tick_array(
            &position.pool_id,
            position.tick_upper - 1,
            pool.tick_spacing,
        )?
        .address,
        recipient_token_account_0: associated_token_address(owner, &pool.mint_a, &program_a),
        recipient_token_account_1: associated_token_address(owner, &pool.mint_b, &program_b),
        vault_0_mint: pool.mint_a,
        vault_1_mint: pool.mint_b,
        rewards,
    };
    let args = decrease_liquidity::DecreaseLiquidityArgs {
        liquidity: liquidity_delta,
        amount_0_min: 0,
        amount_1_min: 0,
    };
    instructions.push(decrease_liquidity::build(&accounts, &args)?);
    Ok(instructions)
}

/// Remove a fraction of the position's liquidity (10_000 bps = all).
pub async fn remove_plan<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    position: &PersonalPosition,
    owner: &Pubkey,
    bps: u16,
) -> Result<InstructionPlan> {
    let pool = clmm_pool(reader, cache, &position.pool_id, true).await?;
    let delta = (primitive_types::U256::from(position.liquidity)
        * primitive_types::U256::from(bps.min(10_000))
        / primitive_types::U256::from(10_000u32))
    .low_u128();
    if delta == 0 {
        debug!(nft_mint = %position.nft_mint, "no liquidity to remove");
        return Ok(InstructionPlan::new(vec![]));
    }
    let instructions = decrease_ixs(reader, cache, &pool, position, owner, delta).await?;
    Ok(InstructionPlan::new(instructions))
}

/// Claim fees and rewards: a zero-delta decrease.
pub async fn claim_plan<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    position: &PersonalPosition,
    owner: &Pubkey,
) -> Result<InstructionPlan> {
    let pool = clmm_pool(reader, cache, &position.pool_id, true).await?;
    let instructions = decrease_ixs(reader, cache, &pool, position, owner, 0).await?;
    Ok(InstructionPlan::new(instructions))
}

/// Close: decrease everything, claim with a zero delta, then
/// `close_position`. The program rejects closes with residual liquidity or
/// unclaimed fees, so the order is load-bearing.
pub async fn close_plan<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    config: &AdapterConfig,
    position: &PersonalPosition,
    owner: &Pubkey,
) -> Result<InstructionPlan> {
    let pool = clmm_pool(reader, cache, &position.pool_id, true).await?;

    let mut instructions = Vec::new();
    if position.liquidity > 0 {
        instructions
            .extend(decrease_ixs(reader, cache, &pool, position, owner, position.liquidity).await?);
    }
    // second decrease with zero delta settles remaining fees/rewards
    instructions.extend(decrease_ixs(reader, cache, &pool, position, owner, 0).await?);

    let (_, nft_program) = mint_info(reader, cache, &position.nft_mint).await?;
    let accounts = close_position::ClosePositionAccounts {
        nft_owner: *owner,
        position_nft_mint: position.nft_mint,
        position_nft_account: associated_token_address(owner, &position.nft_mint, &nft_program),
        personal_position: derive_personal_position(&position.nft_mint)?.address,
        nft_token_program: nft_program,
    };
    instructions.push(close_position::build(&accounts));

    if config.unwrap_wsol_on_close && (pool.mint_a == WSOL_MINT || pool.mint_b == WSOL_MINT) {
        instructions.push(unwrap_wsol_instruction(owner));
    }
    Ok(InstructionPlan::new(instructions))
}

/// Enumerate the owner's positions by walking their NFT holdings under both
/// token programs and resolving each mint to a personal-position PDA.
pub async fn positions_by_owner<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    owner: &Pubkey,
    pool_filter: Option<&Pubkey>,
) -> Result<Vec<PositionSnapshot>> {
    let mut snapshots = Vec::new();
    for token_program in [TOKEN_PROGRAM_ID, TOKEN_2022_PROGRAM_ID] {
        let accounts = reader.token_accounts_by_owner(owner, &token_program).await?;
        for (_, account) in accounts {
            let Some(view) = TokenAccountView::read(&account.data) else {
                continue;
            };
            if view.amount != 1 {
                continue;
            }
            let Ok(position) = fetch_position(reader, &view.mint).await else {
                continue;
            };
            if let Some(filter) = pool_filter {
                if position.pool_id != *filter {
                    continue;
                }
            }
            match clmm_pool(reader, cache, &position.pool_id, false).await {
                Ok(pool) => {
                    snapshots.push(position_snapshot(&pool, &position, Some(*owner))?)
                }
                Err(err) => {
                    debug!(nft_mint = %view.mint, %err, "skipping position with unavailable pool");
                }
            }
        }
    }
    Ok(snapshots)
}

/// Reduce a decoded pool to the caller-facing snapshot.
pub fn pool_snapshot(address: &Pubkey, pool: &PoolState) -> Result<PoolSnapshot> {
    Ok(PoolSnapshot {
        address: *address,
        protocol: ProtocolKind::Tick,
        token_a: Token {
            mint: pool.mint_a,
            decimals: pool.mint_decimals_a,
        },
        token_b: Token {
            mint: pool.mint_b,
            decimals: pool.mint_decimals_b,
        },
        price: math::sqrt_price_x64_to_price(
            pool.sqrt_price_x64,
            pool.mint_decimals_a,
            pool.mint_decimals_b,
        )?,
        step: pool.tick_spacing,
        current_unit: pool.tick_current,
        liquidity: pool.liquidity,
        rewards: pool
            .live_rewards()
            .map(|r| RewardSlot {
                mint: r.token_mint,
                vault: r.token_vault,
            })
            .collect(),
    })
}

/// Reduce a decoded position to the caller-facing snapshot.
pub fn position_snapshot(
    pool: &PoolState,
    position: &PersonalPosition,
    owner: Option<Pubkey>,
) -> Result<PositionSnapshot> {
    Ok(PositionSnapshot {
        id: position.nft_mint,
        pool: position.pool_id,
        protocol: ProtocolKind::Tick,
        owner,
        lower_unit: position.tick_lower,
        upper_unit: position.tick_upper,
        price_lower: math::tick_to_price(
            position.tick_lower,
            pool.mint_decimals_a,
            pool.mint_decimals_b,
        )?,
        price_upper: math::tick_to_price(
            position.tick_upper,
            pool.mint_decimals_a,
            pool.mint_decimals_b,
        )?,
        liquidity: position.liquidity,
        active_units: Vec::new(),
        fees_owed_a: position.token_fees_owed_a,
        fees_owed_b: position.token_fees_owed_b,
        in_range: (position.tick_lower..=position.tick_upper).contains(&pool.tick_current),
    })
}
